/**
 * registry.rs
 * Named ontology instances: the builtin set plus manifest-defined ones
 *
 * Builtins are constructed once per process on first use. Their files live
 * under the ontology data directory (`TYTO_ONTOLOGY_DIR`, else the crate's
 * `ontologies/` directory) and are only parsed when a lookup needs them.
 */

use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

use crate::config::{ClientConfig, OntologyDefinition, OntologyManifest, SanitizeRules, UriNamespace};
use crate::errors::{Result, TytoError};
use crate::ontology::facade::Ontology;

/// Ontologies addressable by name
#[derive(Debug, Default)]
pub struct OntologyRegistry {
    ontologies: Vec<Ontology>,
}

impl OntologyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every definition; the first invalid one aborts
    pub fn from_definitions(definitions: &[OntologyDefinition], base_dir: &Path, config: &ClientConfig) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.insert(Ontology::from_definition(definition, base_dir, config)?);
        }
        Ok(registry)
    }

    pub fn from_manifest(manifest: &OntologyManifest, config: &ClientConfig) -> Result<Self> {
        Self::from_definitions(&manifest.ontologies, &manifest.base_dir, config)
    }

    /// Builtin ontologies; a definition that fails to build is logged and skipped
    pub fn builtin(config: &ClientConfig) -> Self {
        let base_dir = config.ontology_dir();
        let mut registry = Self::new();
        for definition in builtin_definitions() {
            match Ontology::from_definition(&definition, &base_dir, config) {
                Ok(ontology) => registry.insert(ontology),
                Err(e) => tracing::error!(ontology = %definition.name, error = %e, "skipping builtin ontology"),
            }
        }
        registry
    }

    /// Add an ontology, replacing any existing one with the same name
    pub fn insert(&mut self, ontology: Ontology) {
        self.ontologies
            .retain(|o| !o.name().eq_ignore_ascii_case(ontology.name()));
        self.ontologies.push(ontology);
    }

    /// Case-insensitive lookup by name
    pub fn get(&self, name: &str) -> Result<&Ontology> {
        self.ontologies
            .iter()
            .find(|o| o.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                TytoError::Configuration(format!(
                    "Unknown ontology '{}' (known: {})",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.ontologies.iter().map(Ontology::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ontology> {
        self.ontologies.iter()
    }

    pub fn len(&self) -> usize {
        self.ontologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ontologies.is_empty()
    }

    pub fn configure_cache_size(&self, capacity: u64) {
        for ontology in &self.ontologies {
            ontology.configure_cache_size(capacity);
        }
    }
}

static BUILTINS: Lazy<OntologyRegistry> = Lazy::new(|| OntologyRegistry::builtin(&ClientConfig::from_env()));

/// Process-wide builtin registry
///
/// The graph files are not distributed with the crate. OM, SBOL2, SBOL3,
/// PAML and UML have no remote endpoint, so their lookups fail until the
/// files are placed in the ontology data directory. `GraphBackend::is_available`
/// tells whether a file is present.
pub fn builtins() -> &'static OntologyRegistry {
    &BUILTINS
}

/// Builtin ontology by name
pub fn get(name: &str) -> Result<&'static Ontology> {
    builtins().get(name)
}

/// Resize the lookup caches of every builtin ontology
pub fn configure_cache_size(capacity: u64) {
    builtins().configure_cache_size(capacity);
}

/// Path of a file under the ontology data directory
pub fn installation_path(relative: impl AsRef<Path>) -> PathBuf {
    ClientConfig::from_env().ontology_dir().join(relative)
}

fn namespaces(public: &[&str], native: &str) -> SanitizeRules {
    SanitizeRules {
        uri_namespaces: vec![UriNamespace {
            public: public.iter().map(|p| p.to_string()).collect(),
            native: native.to_string(),
        }],
        ..SanitizeRules::default()
    }
}

fn replacements(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(from, to)| (from.to_string(), to.to_string())).collect()
}

/// Configuration data for the ontologies shipped with the crate
pub fn builtin_definitions() -> Vec<OntologyDefinition> {
    vec![
        OntologyDefinition::new("SO")
            .with_path("so.owl")
            .with_uri("http://purl.obolibrary.org/obo/so.owl")
            .with_endpoint("ontobee")
            .with_sanitize(namespaces(
                &["https://identifiers.org/SO:", "http://identifiers.org/so/SO:"],
                "http://purl.obolibrary.org/obo/SO_",
            )),
        OntologyDefinition::new("SBO")
            .with_path("SBO_OWL.owl")
            .with_uri("http://biomodels.net/SBO/")
            .with_endpoint("ontobee")
            .with_sanitize(namespaces(
                &["https://identifiers.org/SBO:", "http://identifiers.org/sbo/SBO:"],
                "http://biomodels.net/SBO/SBO_",
            )),
        OntologyDefinition::new("NCIT")
            .with_uri("http://purl.obolibrary.org/obo/ncit.owl")
            .with_endpoint("ontobee")
            .with_sanitize(namespaces(
                &["https://identifiers.org/ncit:", "http://identifiers.org/ncit/ncit:"],
                "http://purl.obolibrary.org/obo/NCIT_",
            )),
        OntologyDefinition::new("OM")
            .with_path("om-2.0.rdf")
            .with_sanitize(SanitizeRules {
                // American spellings map onto the ontology's British/Dutch labels
                term_replacements: Some(replacements(&[
                    ("liter", "litre"),
                    ("meter", "metre"),
                    ("molar", "molair"),
                    ("_", " "),
                ])),
                reverse_term_replacements: replacements(&[
                    ("litre", "liter"),
                    ("metre", "meter"),
                    ("molair", "molar"),
                ]),
                ..SanitizeRules::default()
            }),
        OntologyDefinition::new("EDAM")
            .with_uri("http://edamontology.org/EDAM.owl")
            .with_endpoint("ontobee"),
        OntologyDefinition::new("NCBITaxon")
            .with_uri("http://purl.obolibrary.org/obo/ncbitaxon.owl")
            .with_endpoint("ols")
            .with_sanitize(namespaces(
                &["https://identifiers.org/taxonomy:"],
                "http://purl.obolibrary.org/obo/NCBITaxon_",
            )),
        OntologyDefinition::new("SBOL2")
            .with_path("sbol-owl/sbol.rdf")
            .with_uri("http://sbols.org/v2"),
        OntologyDefinition::new("SBOL3")
            .with_path("sbol-owl3/sbolowl3.rdf")
            .with_uri("http://sbols.org/v3"),
        OntologyDefinition::new("PAML")
            .with_path("paml/paml/paml.ttl")
            .with_uri("http://bioprotocols.org/paml#"),
        OntologyDefinition::new("UML")
            .with_path("paml/uml/uml.ttl")
            .with_uri("http://bioprotocols.org/uml#"),
        OntologyDefinition::new("PubChem").with_endpoint("pubchem"),
    ]
}
