/**
 * graph.rs
 * Local ontology file backed by an in-memory Oxigraph store
 *
 * The store starts unloaded. The first `load()` parses the file (Turtle for
 * `.ttl`, RDF/XML otherwise) and the store then stays resident; concurrent
 * callers block on the same initialization instead of parsing twice.
 */

use once_cell::sync::OnceCell;
use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::drivers::sparql::{sparql_query_backend, SparqlExecutor, SparqlResults};
use crate::errors::{Result, TytoError};
use crate::ontology::query::SparqlQuery;
use crate::ontology::Ontology;

pub struct GraphBackend {
    name: String,
    path: PathBuf,
    store: OnceCell<Store>,
}

impl GraphBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("graph:{}", path.display()),
            path,
            store: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists
    pub fn is_available(&self) -> bool {
        self.path.is_file()
    }

    pub fn is_loaded(&self) -> bool {
        self.store.get().is_some()
    }

    /// Parse the backing file once; later calls are no-ops
    pub fn load(&self) -> Result<()> {
        self.store.get_or_try_init(|| self.parse()).map(|_| ())
    }

    /// Serialization inferred from the file extension
    pub fn format_for(path: &Path) -> RdfFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ttl") => RdfFormat::Turtle,
            _ => RdfFormat::RdfXml,
        }
    }

    fn parse(&self) -> Result<Store> {
        tracing::info!(path = %self.path.display(), "loading ontology graph");

        if !self.path.exists() {
            return Err(TytoError::GraphLoad(format!(
                "File not found: {}",
                self.path.display()
            )));
        }
        if self.path.is_dir() {
            return Err(TytoError::GraphLoad(format!(
                "Path is a directory: {}",
                self.path.display()
            )));
        }

        let store = Store::new().map_err(|e| TytoError::GraphLoad(e.to_string()))?;
        let reader = BufReader::new(File::open(&self.path)?);
        store
            .load_from_reader(Self::format_for(&self.path), reader)
            .map_err(|e| TytoError::GraphLoad(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), triples = store.len().unwrap_or(0), "ontology graph loaded");
        Ok(store)
    }

    fn store(&self) -> Result<&Store> {
        self.store.get().ok_or_else(|| {
            TytoError::Query(format!("Graph not loaded: {}", self.path.display()))
        })
    }
}

impl std::fmt::Debug for GraphBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBackend")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Plain text of an RDF term: IRI, literal lexical form or blank node id
fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

impl SparqlExecutor for GraphBackend {
    fn execute(&self, _ontology: &Ontology, query: &SparqlQuery) -> Result<SparqlResults> {
        // One ontology per file, so no graph qualifier
        let text = query.render("");
        let results = self
            .store()?
            .query(text.as_str())
            .map_err(|e| TytoError::Query(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let vars: Vec<String> = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| TytoError::Query(e.to_string()))?;
                    let row: HashMap<String, String> = solution
                        .iter()
                        .map(|(var, term)| (var.as_str().to_string(), term_value(term)))
                        .collect();
                    rows.push(row);
                }
                Ok(SparqlResults { vars, rows, boolean: None })
            }
            QueryResults::Boolean(answer) => Ok(SparqlResults::boolean(answer)),
            QueryResults::Graph(_) => Err(TytoError::Query(
                "Graph queries are not supported".to_string(),
            )),
        }
    }
}

sparql_query_backend!(GraphBackend);
