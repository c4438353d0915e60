/**
 * config.rs
 * Client settings and the YAML ontology manifest
 *
 * Manifest format:
 * ```yaml
 * ontologies:
 *   - name: SO
 *     path: so.owl
 *     uri: http://purl.obolibrary.org/obo/so.owl
 *     endpoints: [ontobee]
 *     sanitize:
 *       uriNamespaces:
 *         - public: ["https://identifiers.org/SO:", "http://identifiers.org/so/SO:"]
 *           native: http://purl.obolibrary.org/obo/SO_
 * ```
 *
 * Endpoint names: `ontobee`, `ols`, `pubchem`, or `sparql:<url>`.
 */

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, TytoError};

pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable naming the directory that holds ontology files
pub const ONTOLOGY_DIR_ENV: &str = "TYTO_ONTOLOGY_DIR";

/// Settings shared by HTTP backends and ontology caches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub cache_capacity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ontology_dir: Option<PathBuf>,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("tyto-rs/{}", env!("CARGO_PKG_VERSION")),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            ontology_dir: None,
            use_system_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Load settings from a YAML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults overridden by `TYTO_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = env_u64("TYTO_CONNECT_TIMEOUT") {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = env_u64("TYTO_TIMEOUT") {
            config.timeout_secs = secs;
        }
        if let Some(capacity) = env_u64("TYTO_CACHE_SIZE") {
            config.cache_capacity = capacity;
        }
        if let Ok(dir) = env::var(ONTOLOGY_DIR_ENV) {
            if !dir.is_empty() {
                config.ontology_dir = Some(PathBuf::from(dir));
            }
        }
        config
    }

    /// Directory holding the ontology files of the builtin registry
    pub fn ontology_dir(&self) -> PathBuf {
        self.ontology_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/ontologies")))
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Public namespaces that all map onto one native namespace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UriNamespace {
    pub public: Vec<String>,
    pub native: String,
}

/// Text rewriting rules applied around every lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SanitizeRules {
    pub uri_namespaces: Vec<UriNamespace>,
    /// Applied in order to a caller's term. `None` keeps the default
    /// underscore-to-space rewrite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_replacements: Option<Vec<(String, String)>>,
    pub reverse_term_replacements: Vec<(String, String)>,
}

/// Configuration data for one ontology
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OntologyDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub sanitize: SanitizeRules,
}

impl OntologyDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            uri: None,
            endpoints: Vec::new(),
            sanitize: SanitizeRules::default(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    pub fn without_endpoints(mut self) -> Self {
        self.endpoints.clear();
        self
    }

    pub fn with_sanitize(mut self, rules: SanitizeRules) -> Self {
        self.sanitize = rules;
        self
    }

    /// Absolute file path, with relative paths taken from `base_dir`
    pub fn resolve_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                base_dir.join(p)
            }
        })
    }

    pub fn endpoint_specs(&self) -> Result<Vec<EndpointSpec>> {
        self.endpoints.iter().map(|e| EndpointSpec::parse(e)).collect()
    }
}

/// Parsed form of a manifest endpoint entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSpec {
    Ontobee,
    Ols,
    PubChem,
    Sparql(String),
}

impl EndpointSpec {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Some(url) = trimmed.strip_prefix("sparql:") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(TytoError::Configuration(format!(
                    "SPARQL endpoint must be an http(s) URL: {}",
                    raw
                )));
            }
            return Ok(EndpointSpec::Sparql(url.to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "ontobee" => Ok(EndpointSpec::Ontobee),
            "ols" | "ebi" | "ebi-ols" => Ok(EndpointSpec::Ols),
            "pubchem" => Ok(EndpointSpec::PubChem),
            _ => Err(TytoError::Configuration(format!(
                "Unknown endpoint '{}' (expected ontobee, ols, pubchem, or sparql:<url>)",
                raw
            ))),
        }
    }
}

/// A set of ontology definitions loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OntologyManifest {
    #[serde(default)]
    pub ontologies: Vec<OntologyDefinition>,
    /// Directory relative `path` entries are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl OntologyManifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TytoError::Configuration(format!(
                "Manifest not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let mut manifest = Self::from_yaml(&content)?;
        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: OntologyManifest = serde_yaml::from_str(content)?;
        for def in &manifest.ontologies {
            if def.name.trim().is_empty() {
                return Err(TytoError::Configuration(
                    "Ontology definition without a name".to_string(),
                ));
            }
        }
        Ok(manifest)
    }

    pub fn get(&self, name: &str) -> Option<&OntologyDefinition> {
        self.ontologies
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}
