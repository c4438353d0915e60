//! SPARQL-backed query protocol
//!
//! `SparqlProtocol` holds the query strategy shared by every SPARQL source;
//! a backend only supplies a [`SparqlExecutor`] that runs a query and hands
//! back normalized results. `SparqlEndpoint` is the remote executor, with a
//! [`GraphNaming`] strategy for scoping queries inside merged stores.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::drivers::http::HttpClient;
use crate::drivers::traits::{non_empty, QueryBackend};
use crate::errors::{Result, TytoError};
use crate::ontology::matching::{disambiguate, distinct};
use crate::ontology::query::{is_safe_iri, SparqlQuery};
use crate::ontology::Ontology;

pub const ONTOBEE_SPARQL_URL: &str = "http://sparql.hegroup.org/sparql/";

const OBO_PURL: &str = "http://purl.obolibrary.org/obo/";
const OBO_MERGED: &str = "http://purl.obolibrary.org/obo/merged/";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Normalized query answer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparqlResults {
    pub vars: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
    pub boolean: Option<bool>,
}

#[derive(Deserialize)]
struct JsonResults {
    #[serde(default)]
    head: JsonHead,
    results: Option<JsonBindings>,
    boolean: Option<bool>,
}

#[derive(Deserialize, Default)]
struct JsonHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct JsonBindings {
    #[serde(default)]
    bindings: Vec<HashMap<String, JsonTerm>>,
}

#[derive(Deserialize)]
struct JsonTerm {
    value: String,
}

impl SparqlResults {
    pub fn boolean(value: bool) -> Self {
        Self {
            boolean: Some(value),
            ..Self::default()
        }
    }

    /// Parse the SPARQL 1.1 JSON results format
    pub fn from_json(body: &str) -> Result<Self> {
        let parsed: JsonResults = serde_json::from_str(body)?;
        let rows = parsed
            .results
            .map(|r| {
                r.bindings
                    .into_iter()
                    .map(|b| b.into_iter().map(|(var, term)| (var, term.value)).collect())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            vars: parsed.head.vars,
            rows,
            boolean: parsed.boolean,
        })
    }

    /// Bound values in variable-then-row order
    pub fn flatten(&self) -> Vec<String> {
        let mut values = Vec::new();
        for var in &self.vars {
            for row in &self.rows {
                if let Some(value) = row.get(var) {
                    values.push(value.clone());
                }
            }
        }
        values
    }

    pub fn column(&self, var: &str) -> Vec<String> {
        self.rows.iter().filter_map(|row| row.get(var).cloned()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.boolean.is_none()
    }
}

/// Runs a query on behalf of an ontology
pub trait SparqlExecutor: Send + Sync {
    fn execute(&self, ontology: &Ontology, query: &SparqlQuery) -> Result<SparqlResults>;
}

/// Query strategy shared by the local graph and remote SPARQL endpoints
pub struct SparqlProtocol;

impl SparqlProtocol {
    pub fn term_for_uri(exec: &dyn SparqlExecutor, ontology: &Ontology, uri: &str) -> Result<Option<String>> {
        if !is_safe_iri(uri) {
            return Ok(None);
        }
        let results = exec.execute(ontology, &SparqlQuery::label_of(uri))?;
        Ok(results.flatten().into_iter().next())
    }

    pub fn uri_for_term(exec: &dyn SparqlExecutor, ontology: &Ontology, term: &str) -> Result<Option<String>> {
        if term.trim().is_empty() {
            return Ok(None);
        }
        let loose = distinct(exec.execute(ontology, &SparqlQuery::uri_by_label(term, false))?.flatten());
        disambiguate(term, loose, || {
            Ok(distinct(
                exec.execute(ontology, &SparqlQuery::uri_by_label(term, true))?.flatten(),
            ))
        })
    }

    pub fn ask(exec: &dyn SparqlExecutor, ontology: &Ontology, query: SparqlQuery) -> Result<Option<bool>> {
        let results = exec.execute(ontology, &query)?;
        match results.boolean {
            Some(answer) => Ok(Some(answer)),
            None if results.is_empty() => Ok(None),
            None => Err(TytoError::UnexpectedResponse(
                "ASK query returned no boolean".to_string(),
            )),
        }
    }

    pub fn is_child_of(exec: &dyn SparqlExecutor, ontology: &Ontology, child: &str, parent: &str) -> Result<Option<bool>> {
        if !is_safe_iri(child) || !is_safe_iri(parent) {
            return Ok(None);
        }
        Self::ask(exec, ontology, SparqlQuery::is_subclass(child, parent))
    }

    pub fn is_descendant_of(exec: &dyn SparqlExecutor, ontology: &Ontology, descendant: &str, ancestor: &str) -> Result<Option<bool>> {
        if !is_safe_iri(descendant) || !is_safe_iri(ancestor) {
            return Ok(None);
        }
        Self::ask(exec, ontology, SparqlQuery::is_descendant(descendant, ancestor))
    }

    pub fn select_uris(exec: &dyn SparqlExecutor, ontology: &Ontology, uri: &str, build: fn(&str) -> SparqlQuery) -> Result<Option<Vec<String>>> {
        if !is_safe_iri(uri) {
            return Ok(None);
        }
        let results = exec.execute(ontology, &build(uri))?;
        Ok(non_empty(distinct(results.flatten())))
    }

    pub fn get_ontologies(exec: &dyn SparqlExecutor, ontology: &Ontology) -> Result<Option<BTreeMap<String, String>>> {
        let results = exec.execute(ontology, &SparqlQuery::ontologies())?;
        let mut ontologies = BTreeMap::new();
        for row in &results.rows {
            if let Some(uri) = row.get("ontology") {
                let title = row.get("title").cloned().unwrap_or_default();
                let entry = ontologies.entry(uri.clone()).or_insert_with(String::new);
                if entry.is_empty() {
                    *entry = title;
                }
            }
        }
        Ok(if ontologies.is_empty() { None } else { Some(ontologies) })
    }

    pub fn is_instance(exec: &dyn SparqlExecutor, ontology: &Ontology, uri: &str) -> Result<Option<bool>> {
        if !is_safe_iri(uri) {
            return Ok(None);
        }
        Self::ask(exec, ontology, SparqlQuery::is_named_individual(uri))
    }
}

/// Every SPARQL executor answers the full backend protocol
macro_rules! sparql_query_backend {
    ($backend:ty) => {
        impl $crate::drivers::traits::QueryBackend for $backend {
            fn name(&self) -> &str {
                &self.name
            }

            fn term_for_uri(&self, ontology: &$crate::ontology::Ontology, uri: &str) -> $crate::errors::Result<Option<String>> {
                $crate::drivers::sparql::SparqlProtocol::term_for_uri(self, ontology, uri)
            }

            fn uri_for_term(&self, ontology: &$crate::ontology::Ontology, term: &str) -> $crate::errors::Result<Option<String>> {
                $crate::drivers::sparql::SparqlProtocol::uri_for_term(self, ontology, term)
            }

            fn is_child_of(&self, ontology: &$crate::ontology::Ontology, child: &str, parent: &str) -> $crate::errors::Result<Option<bool>> {
                $crate::drivers::sparql::SparqlProtocol::is_child_of(self, ontology, child, parent)
            }

            fn is_descendant_of(&self, ontology: &$crate::ontology::Ontology, descendant: &str, ancestor: &str) -> $crate::errors::Result<Option<bool>> {
                $crate::drivers::sparql::SparqlProtocol::is_descendant_of(self, ontology, descendant, ancestor)
            }

            fn get_parents(&self, ontology: &$crate::ontology::Ontology, uri: &str) -> $crate::errors::Result<Option<Vec<String>>> {
                $crate::drivers::sparql::SparqlProtocol::select_uris(self, ontology, uri, $crate::ontology::query::SparqlQuery::parents)
            }

            fn get_children(&self, ontology: &$crate::ontology::Ontology, uri: &str) -> $crate::errors::Result<Option<Vec<String>>> {
                $crate::drivers::sparql::SparqlProtocol::select_uris(self, ontology, uri, $crate::ontology::query::SparqlQuery::children)
            }

            fn get_ancestors(&self, ontology: &$crate::ontology::Ontology, uri: &str) -> $crate::errors::Result<Option<Vec<String>>> {
                $crate::drivers::sparql::SparqlProtocol::select_uris(self, ontology, uri, $crate::ontology::query::SparqlQuery::ancestors)
            }

            fn get_descendants(&self, ontology: &$crate::ontology::Ontology, uri: &str) -> $crate::errors::Result<Option<Vec<String>>> {
                $crate::drivers::sparql::SparqlProtocol::select_uris(self, ontology, uri, $crate::ontology::query::SparqlQuery::descendants)
            }

            fn get_ontologies(&self, ontology: &$crate::ontology::Ontology) -> $crate::errors::Result<Option<std::collections::BTreeMap<String, String>>> {
                $crate::drivers::sparql::SparqlProtocol::get_ontologies(self, ontology)
            }

            fn is_instance(&self, ontology: &$crate::ontology::Ontology, uri: &str) -> $crate::errors::Result<Option<bool>> {
                $crate::drivers::sparql::SparqlProtocol::is_instance(self, ontology, uri)
            }

            fn get_instances(&self, ontology: &$crate::ontology::Ontology, class_uri: &str) -> $crate::errors::Result<Option<Vec<String>>> {
                $crate::drivers::sparql::SparqlProtocol::select_uris(self, ontology, class_uri, $crate::ontology::query::SparqlQuery::instances_of)
            }
        }
    };
}

pub(crate) use sparql_query_backend;

/// How a remote store names the graph holding one ontology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNaming {
    /// Query the whole store
    Unscoped,
    /// `FROM <ontology uri>`
    Plain,
    /// Ontobee: `http://purl.obolibrary.org/obo/<x>.owl` lives in
    /// `http://purl.obolibrary.org/obo/merged/<X>`
    OboMerged,
}

impl GraphNaming {
    pub fn from_clause(&self, ontology_uri: Option<&str>) -> String {
        let uri = match ontology_uri {
            Some(uri) if !uri.is_empty() && is_safe_iri(uri) => uri,
            _ => return String::new(),
        };
        match self {
            GraphNaming::Unscoped => String::new(),
            GraphNaming::Plain => format!("FROM <{}>", uri),
            GraphNaming::OboMerged => format!("FROM <{}>", obo_merged_graph(uri)),
        }
    }
}

fn obo_merged_graph(ontology_uri: &str) -> String {
    match ontology_uri.strip_prefix(OBO_PURL) {
        Some(rest) => format!("{}{}", OBO_MERGED, rest.replace(".owl", "").to_uppercase()),
        None => ontology_uri.to_string(),
    }
}

/// Remote SPARQL 1.1 endpoint returning JSON results
#[derive(Debug)]
pub struct SparqlEndpoint {
    name: String,
    url: String,
    naming: GraphNaming,
    http: HttpClient,
}

impl SparqlEndpoint {
    pub fn new(url: impl Into<String>, config: &ClientConfig) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            url,
            naming: GraphNaming::Plain,
            http: HttpClient::new(config),
        }
    }

    /// The Ontobee linked-data server, which merges every OBO ontology into
    /// one store
    pub fn ontobee(config: &ClientConfig) -> Self {
        Self::new(ONTOBEE_SPARQL_URL, config)
            .with_name("Ontobee")
            .with_naming(GraphNaming::OboMerged)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_naming(mut self, naming: GraphNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn naming(&self) -> GraphNaming {
        self.naming
    }

    pub fn into_backend(self) -> Arc<dyn QueryBackend> {
        Arc::new(self)
    }
}

impl SparqlExecutor for SparqlEndpoint {
    fn execute(&self, ontology: &Ontology, query: &SparqlQuery) -> Result<SparqlResults> {
        let from_clause = self.naming.from_clause(ontology.uri());
        let text = query.render(&from_clause);
        tracing::debug!(endpoint = %self.name, ontology = %ontology.name(), "remote SPARQL query");

        match self.http.get_text(
            &self.url,
            &[("query", text.as_str()), ("format", "json")],
            SPARQL_RESULTS_JSON,
        )? {
            Some(body) => SparqlResults::from_json(&body),
            None => Ok(SparqlResults::default()),
        }
    }
}

sparql_query_backend!(SparqlEndpoint);
