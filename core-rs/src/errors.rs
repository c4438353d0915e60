//! Error types for Tyto

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TytoError {
    /// Every backend was tried and none produced a result.
    #[error("{message}")]
    LookupFailed { input: String, message: String },

    /// A term resolved to more than one URI and could not be narrowed down.
    #[error("Ambiguous term '{term}': matches {}", candidates.join(", "))]
    AmbiguousTerm { term: String, candidates: Vec<String> },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Graph load error: {0}")]
    GraphLoad(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TytoError {
    pub fn lookup_failed(input: impl Into<String>, message: impl Into<String>) -> Self {
        TytoError::LookupFailed {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Fatal errors abort a dispatch; everything else a backend raises is
    /// logged and the next backend is tried. Configuration errors are
    /// raised at construction, never from inside a dispatch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TytoError::AmbiguousTerm { .. })
    }
}

pub type Result<T> = std::result::Result<T, TytoError>;
