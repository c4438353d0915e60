//! Drivers module for ontology query sources
//!
//! Provides the backend query protocol (QueryBackend trait) and implementations:
//! - GraphBackend: Local ontology file in an in-memory Oxigraph store
//! - SparqlEndpoint: Remote SPARQL 1.1 service (Ontobee preset)
//! - OlsBackend: EBI Ontology Lookup Service REST API
//! - PubChemBackend: PubChem substance REST API
//!
//! Remote services are shared process-wide: `ontobee()`, `ols()` and
//! `pubchem()` hand out the same instance to every ontology that uses them.

pub mod traits;
pub mod http;
pub mod graph;
pub mod sparql;
pub mod ols;
pub mod pubchem;

#[cfg(test)]
pub(crate) mod stub_server;

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::config::ClientConfig;

pub use traits::QueryBackend;
pub use http::{HttpClient, StatusClass};
pub use graph::GraphBackend;
pub use sparql::{GraphNaming, SparqlEndpoint, SparqlExecutor, SparqlProtocol, SparqlResults, ONTOBEE_SPARQL_URL};
pub use ols::{OlsBackend, OLS_API_URL};
pub use pubchem::{PubChemBackend, PUBCHEM_API_URL, PUBCHEM_SUBSTANCE_NAMESPACE};

static ONTOBEE: Lazy<Arc<SparqlEndpoint>> =
    Lazy::new(|| Arc::new(SparqlEndpoint::ontobee(&ClientConfig::from_env())));

static OLS: Lazy<Arc<OlsBackend>> = Lazy::new(|| Arc::new(OlsBackend::new(&ClientConfig::from_env())));

static PUBCHEM: Lazy<Arc<PubChemBackend>> =
    Lazy::new(|| Arc::new(PubChemBackend::new(&ClientConfig::from_env())));

/// Shared Ontobee SPARQL endpoint
pub fn ontobee() -> Arc<dyn QueryBackend> {
    ONTOBEE.clone()
}

/// Shared EBI OLS client
pub fn ols() -> Arc<dyn QueryBackend> {
    OLS.clone()
}

/// Shared PubChem client
pub fn pubchem() -> Arc<dyn QueryBackend> {
    PUBCHEM.clone()
}
