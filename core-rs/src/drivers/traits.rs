//! Query backend trait for Tyto
//!
//! Defines the capability set every query source implements.
//! Implementations include:
//! - GraphBackend (local ontology file loaded into an in-memory store)
//! - SparqlEndpoint (remote SPARQL 1.1 service, e.g. Ontobee)
//! - OlsBackend (EBI Ontology Lookup Service REST API)
//! - PubChemBackend (PubChem substance REST API)

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::ontology::Ontology;

/// Backend query protocol
///
/// Every operation receives the owning [`Ontology`] so one backend instance
/// can serve many ontologies; the ontology's canonical URI scopes requests.
///
/// Return values:
/// - `Ok(Some(_))` - the backend answered
/// - `Ok(None)` - the backend found nothing (absent, not an error)
/// - `Err(_)` - the backend failed; the dispatcher logs it and moves on
///   unless the error is fatal (see [`crate::TytoError::is_fatal`])
///
/// Relationship and enumeration operations default to absent so a backend
/// only implements what its service can answer.
pub trait QueryBackend: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    fn term_for_uri(&self, ontology: &Ontology, uri: &str) -> Result<Option<String>>;

    fn uri_for_term(&self, ontology: &Ontology, term: &str) -> Result<Option<String>>;

    /// Direct subclass test
    fn is_child_of(&self, _ontology: &Ontology, _child: &str, _parent: &str) -> Result<Option<bool>> {
        Ok(None)
    }

    fn is_parent_of(&self, ontology: &Ontology, parent: &str, child: &str) -> Result<Option<bool>> {
        self.is_child_of(ontology, child, parent)
    }

    /// Reflexive-transitive subclass test
    fn is_descendant_of(&self, _ontology: &Ontology, _descendant: &str, _ancestor: &str) -> Result<Option<bool>> {
        Ok(None)
    }

    fn is_ancestor_of(&self, ontology: &Ontology, ancestor: &str, descendant: &str) -> Result<Option<bool>> {
        self.is_descendant_of(ontology, descendant, ancestor)
    }

    fn get_parents(&self, _ontology: &Ontology, _uri: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    fn get_children(&self, _ontology: &Ontology, _uri: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    fn get_ancestors(&self, _ontology: &Ontology, _uri: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    fn get_descendants(&self, _ontology: &Ontology, _uri: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    /// Ontology URI -> title for every ontology the source knows
    fn get_ontologies(&self, _ontology: &Ontology) -> Result<Option<BTreeMap<String, String>>> {
        Ok(None)
    }

    fn is_instance(&self, _ontology: &Ontology, _uri: &str) -> Result<Option<bool>> {
        Ok(None)
    }

    fn get_instances(&self, _ontology: &Ontology, _class_uri: &str) -> Result<Option<Vec<String>>> {
        Ok(None)
    }
}

/// Absent for an empty list so the dispatcher keeps looking
pub(crate) fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
