/**
 * ontology module
 *
 * - query: SPARQL query builders
 * - matching: two-pass term disambiguation
 * - sanitize: public <-> native URI/term rewriting
 * - cache: bounded LRU memo for term/URI lookups
 * - facade: Ontology façade and fallback dispatcher
 * - value: URI/Term values bound to their ontology
 * - registry: builtin and manifest-defined ontologies
 */

pub mod query;
pub mod matching;
pub mod sanitize;
pub mod cache;
pub mod facade;
pub mod value;
pub mod registry;

pub use query::{QueryForm, SparqlQuery};
pub use matching::LabelMatcher;
pub use sanitize::{multi_replace, DefaultSanitizer, RuleSanitizer, SanitizeHooks, Sanitizer};
pub use cache::LookupCache;
pub use facade::{Ontology, OntologyBuilder};
pub use value::{Term, Uri};
pub use registry::{builtin_definitions, builtins, configure_cache_size, installation_path, OntologyRegistry};
