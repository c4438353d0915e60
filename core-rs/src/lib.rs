//! # Tyto - ontology term and URI lookup
//!
//! Resolves human-readable ontology terms (`"promoter"`) to URIs and back,
//! and answers class-hierarchy questions, over three kinds of source:
//! a local ontology file, SPARQL endpoints, and REST lookup services.
//!
//! ## Core Principle
//!
//! **Local when resident, remote when cheap, local as the last resort**:
//! an `Ontology` asks its already-loaded graph first, then each remote
//! endpoint in order, and only parses its local file when nothing else
//! answered.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Ontology (sanitize, memoize,      │
//! │   dispatch)  ->  Uri / Term values  │
//! └─────────────────────────────────────┘
//!        │              │            │
//!   ┌────┴─────┐  ┌─────┴─────┐  ┌───┴────────┐
//!   │  Graph   │  │  SPARQL   │  │ OLS /      │
//!   │ (file)   │  │ (Ontobee) │  │ PubChem    │
//!   └──────────┘  └───────────┘  └────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tyto::term;
//!
//! let so = tyto::ontology::registry::get("SO")?;
//! let promoter = term!(so, promoter)?;
//! assert!(promoter.is_a(&so.lookup("sequence_feature")?)?);
//! # Ok::<(), tyto::TytoError>(())
//! ```

pub mod errors;
pub mod config;
pub mod drivers;
pub mod ontology;

pub use errors::{Result, TytoError};
pub use config::{ClientConfig, EndpointSpec, OntologyDefinition, OntologyManifest, SanitizeRules, UriNamespace};
pub use drivers::{GraphBackend, GraphNaming, OlsBackend, PubChemBackend, QueryBackend, SparqlEndpoint};
pub use ontology::{
    configure_cache_size, installation_path, multi_replace, Ontology, OntologyBuilder, OntologyRegistry, Sanitizer,
    Term, Uri,
};

/// Version of the tyto crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Term lookup by identifier: `term!(so, promoter)` is `so.lookup("promoter")`
///
/// Use [`Ontology::lookup`] directly for terms that are not valid Rust
/// identifiers.
#[macro_export]
macro_rules! term {
    ($ontology:expr, $name:ident) => {
        $ontology.lookup(stringify!($name))
    };
}
