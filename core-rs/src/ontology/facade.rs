/**
 * facade.rs
 * Ontology façade: sanitization, memoization and the fallback dispatcher
 *
 * Dispatch order for every operation:
 * 1. the local graph, if it is already loaded
 * 2. each remote endpoint in configured order
 * 3. the local graph, loading it first if it was not loaded in step 1
 *
 * The first non-absent answer wins. Non-fatal backend errors are logged and
 * read as absent; only ambiguity propagates.
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ClientConfig, EndpointSpec, OntologyDefinition, DEFAULT_CACHE_CAPACITY};
use crate::drivers::{self, GraphBackend, QueryBackend, SparqlEndpoint};
use crate::errors::{Result, TytoError};
use crate::ontology::cache::LookupCache;
use crate::ontology::sanitize::{DefaultSanitizer, RuleSanitizer, Sanitizer};
use crate::ontology::value::{Term, Uri};

/// One ontology namespace and the sources that can answer for it
pub struct Ontology {
    name: String,
    uri: Option<String>,
    graph: Option<GraphBackend>,
    endpoints: Vec<Arc<dyn QueryBackend>>,
    sanitizer: Box<dyn Sanitizer>,
    term_cache: LookupCache,
    uri_cache: LookupCache,
}

/// Builder for [`Ontology`]; at least a path or one endpoint is required
pub struct OntologyBuilder {
    name: String,
    uri: Option<String>,
    path: Option<PathBuf>,
    endpoints: Vec<Arc<dyn QueryBackend>>,
    sanitizer: Option<Box<dyn Sanitizer>>,
    cache_capacity: u64,
}

impl OntologyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: None,
            path: None,
            endpoints: Vec::new(),
            sanitizer: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Append an endpoint; endpoints are tried in the order added
    pub fn endpoint(mut self, endpoint: Arc<dyn QueryBackend>) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn endpoints<I>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn QueryBackend>>,
    {
        self.endpoints.extend(endpoints);
        self
    }

    pub fn sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Some(Box::new(sanitizer));
        self
    }

    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Ontology> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(TytoError::Configuration(format!(
                    "Invalid path specified for ontology {}",
                    self.name
                )));
            }
        }
        if self.path.is_none() && self.endpoints.is_empty() {
            return Err(TytoError::Configuration(format!(
                "Ontology {} requires a path, endpoints, or both",
                self.name
            )));
        }

        Ok(Ontology {
            name: self.name,
            uri: self.uri.filter(|u| !u.is_empty()),
            graph: self.path.map(GraphBackend::new),
            endpoints: self.endpoints,
            sanitizer: self.sanitizer.unwrap_or_else(|| Box::new(DefaultSanitizer)),
            term_cache: LookupCache::new(self.cache_capacity),
            uri_cache: LookupCache::new(self.cache_capacity),
        })
    }
}

impl Ontology {
    pub fn builder(name: impl Into<String>) -> OntologyBuilder {
        OntologyBuilder::new(name)
    }

    /// Build from manifest data; relative paths resolve against `base_dir`
    pub fn from_definition(definition: &OntologyDefinition, base_dir: &Path, config: &ClientConfig) -> Result<Self> {
        let mut builder = OntologyBuilder::new(definition.name.clone())
            .sanitizer(RuleSanitizer::new(definition.sanitize.clone()))
            .cache_capacity(config.cache_capacity);

        if let Some(uri) = &definition.uri {
            builder = builder.uri(uri.clone());
        }
        if let Some(path) = definition.resolve_path(base_dir) {
            builder = builder.path(path);
        }
        for spec in definition.endpoint_specs()? {
            let endpoint = match spec {
                EndpointSpec::Ontobee => drivers::ontobee(),
                EndpointSpec::Ols => drivers::ols(),
                EndpointSpec::PubChem => drivers::pubchem(),
                EndpointSpec::Sparql(url) => SparqlEndpoint::new(url, config).into_backend(),
            };
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical ontology URI used to scope remote requests
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn graph(&self) -> Option<&GraphBackend> {
        self.graph.as_ref()
    }

    pub fn endpoints(&self) -> &[Arc<dyn QueryBackend>] {
        &self.endpoints
    }

    pub fn sanitizer(&self) -> &dyn Sanitizer {
        self.sanitizer.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.graph.as_ref().map(GraphBackend::is_loaded).unwrap_or(false)
    }

    /// Load the local graph now instead of on demand
    pub fn load(&self) -> Result<()> {
        match &self.graph {
            Some(graph) => graph.load(),
            None => Ok(()),
        }
    }

    // ---- Term/URI lookup ----

    /// Label for a URI, in the caller's term convention
    pub fn term_for_uri(&self, uri: &str) -> Result<Term<'_>> {
        let sanitized = self.sanitizer.sanitize_uri(uri);
        let term = match self.term_cache.get(&sanitized) {
            Some(term) => term,
            None => {
                let term = self
                    .dispatch("term_for_uri", |b| b.term_for_uri(self, &sanitized))?
                    .ok_or_else(|| TytoError::lookup_failed(uri, format!("No matching term found for {}", uri)))?;
                self.term_cache.insert(sanitized.clone(), term.clone());
                term
            }
        };
        Ok(Term::new(self.sanitizer.reverse_sanitize_term(&term), sanitized, self))
    }

    /// URI for a term, in the public URI convention
    pub fn uri_for_term(&self, term: &str) -> Result<Uri<'_>> {
        let sanitized = self.sanitizer.sanitize_term(term);
        let uri = match self.uri_cache.get(&sanitized) {
            Some(uri) => uri,
            None => {
                let uri = self
                    .dispatch("uri_for_term", |b| b.uri_for_term(self, &sanitized))?
                    .ok_or_else(|| TytoError::lookup_failed(term, format!("{} is not a valid ontology term", term)))?;
                self.uri_cache.insert(sanitized.clone(), uri.clone());
                uri
            }
        };
        Ok(Uri::new(self.sanitizer.reverse_sanitize_uri(&uri), self))
    }

    /// Term lookup by name; see also the `term!` macro
    pub fn lookup(&self, term: &str) -> Result<Uri<'_>> {
        self.uri_for_term(term)
    }

    // ---- Relationships ----

    pub fn is_child_of(&self, child: &str, parent: &str) -> Result<bool> {
        let (child, parent) = (self.sanitizer.sanitize_uri(child), self.sanitizer.sanitize_uri(parent));
        self.ask("is_child_of", |b| b.is_child_of(self, &child, &parent))
    }

    pub fn is_parent_of(&self, parent: &str, child: &str) -> Result<bool> {
        let (parent, child) = (self.sanitizer.sanitize_uri(parent), self.sanitizer.sanitize_uri(child));
        self.ask("is_parent_of", |b| b.is_parent_of(self, &parent, &child))
    }

    pub fn is_descendant_of(&self, descendant: &str, ancestor: &str) -> Result<bool> {
        let (descendant, ancestor) = (self.sanitizer.sanitize_uri(descendant), self.sanitizer.sanitize_uri(ancestor));
        self.ask("is_descendant_of", |b| b.is_descendant_of(self, &descendant, &ancestor))
    }

    pub fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let (ancestor, descendant) = (self.sanitizer.sanitize_uri(ancestor), self.sanitizer.sanitize_uri(descendant));
        self.ask("is_ancestor_of", |b| b.is_ancestor_of(self, &ancestor, &descendant))
    }

    pub fn get_parents(&self, uri: &str) -> Result<Vec<Uri<'_>>> {
        let uri = self.sanitizer.sanitize_uri(uri);
        self.enumerate("get_parents", |b| b.get_parents(self, &uri))
    }

    pub fn get_children(&self, uri: &str) -> Result<Vec<Uri<'_>>> {
        let uri = self.sanitizer.sanitize_uri(uri);
        self.enumerate("get_children", |b| b.get_children(self, &uri))
    }

    pub fn get_ancestors(&self, uri: &str) -> Result<Vec<Uri<'_>>> {
        let uri = self.sanitizer.sanitize_uri(uri);
        self.enumerate("get_ancestors", |b| b.get_ancestors(self, &uri))
    }

    pub fn get_descendants(&self, uri: &str) -> Result<Vec<Uri<'_>>> {
        let uri = self.sanitizer.sanitize_uri(uri);
        self.enumerate("get_descendants", |b| b.get_descendants(self, &uri))
    }

    // ---- Ontologies and instances ----

    /// Ontology URI -> title for every ontology the first answering source knows
    pub fn get_ontologies(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .dispatch("get_ontologies", |b| b.get_ontologies(self))?
            .unwrap_or_default())
    }

    pub fn is_instance(&self, uri: &str) -> Result<bool> {
        let uri = self.sanitizer.sanitize_uri(uri);
        self.ask("is_instance", |b| b.is_instance(self, &uri))
    }

    pub fn get_instances(&self, class_uri: &str) -> Result<Vec<Uri<'_>>> {
        let class_uri = self.sanitizer.sanitize_uri(class_uri);
        self.enumerate("get_instances", |b| b.get_instances(self, &class_uri))
    }

    // ---- Cache ----

    /// Resize both lookup caches, discarding their entries
    pub fn configure_cache_size(&self, capacity: u64) {
        self.term_cache.reconfigure(capacity);
        self.uri_cache.reconfigure(capacity);
        tracing::debug!(ontology = %self.name, capacity, "lookup cache reconfigured");
    }

    pub fn cache_capacity(&self) -> u64 {
        self.uri_cache.capacity()
    }

    pub fn clear_cache(&self) {
        self.term_cache.clear();
        self.uri_cache.clear();
    }

    // ---- Dispatch ----

    fn ask<F>(&self, operation: &str, call: F) -> Result<bool>
    where
        F: Fn(&dyn QueryBackend) -> Result<Option<bool>>,
    {
        Ok(self.dispatch(operation, call)?.unwrap_or(false))
    }

    fn enumerate<F>(&self, operation: &str, call: F) -> Result<Vec<Uri<'_>>>
    where
        F: Fn(&dyn QueryBackend) -> Result<Option<Vec<String>>>,
    {
        Ok(self
            .dispatch(operation, call)?
            .unwrap_or_default()
            .iter()
            .map(|uri| Uri::new(self.sanitizer.reverse_sanitize_uri(uri), self))
            .collect())
    }

    /// Try each source in priority order and return the first answer
    pub fn dispatch<T, F>(&self, operation: &str, call: F) -> Result<Option<T>>
    where
        F: Fn(&dyn QueryBackend) -> Result<Option<T>>,
    {
        let graph_was_loaded = self.is_loaded();

        if let Some(graph) = self.graph.as_ref().filter(|_| graph_was_loaded) {
            if let Some(answer) = self.attempt(operation, graph, &call)? {
                return Ok(Some(answer));
            }
        }

        for endpoint in &self.endpoints {
            if let Some(answer) = self.attempt(operation, endpoint.as_ref(), &call)? {
                return Ok(Some(answer));
            }
        }

        if let Some(graph) = self.graph.as_ref().filter(|_| !graph_was_loaded) {
            match graph.load() {
                Ok(()) => {
                    if let Some(answer) = self.attempt(operation, graph, &call)? {
                        return Ok(Some(answer));
                    }
                }
                Err(e) => {
                    tracing::error!(ontology = %self.name, path = %graph.path().display(), error = %e, "failed to load ontology graph");
                }
            }
        }

        tracing::debug!(ontology = %self.name, operation, "no backend answered");
        Ok(None)
    }

    fn attempt<T, F>(&self, operation: &str, backend: &dyn QueryBackend, call: &F) -> Result<Option<T>>
    where
        F: Fn(&dyn QueryBackend) -> Result<Option<T>>,
    {
        tracing::debug!(ontology = %self.name, backend = backend.name(), operation, "dispatching");
        match call(backend) {
            Ok(answer) => Ok(answer),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(ontology = %self.name, backend = backend.name(), operation, error = %e, "backend failed, trying next");
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ontology")
            .field("name", &self.name)
            .field("uri", &self.uri)
            .field("graph", &self.graph)
            .field("endpoints", &self.endpoints.iter().map(|e| e.name()).collect::<Vec<_>>())
            .finish()
    }
}
