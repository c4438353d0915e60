//! Term-to-URI disambiguation
//!
//! A term is first matched case-insensitively. When that yields several
//! URIs the match is retried case-sensitively; one hit wins, none means the
//! term does not exist in that casing, and several is an ambiguity error.

use regex::{Regex, RegexBuilder};

use crate::errors::{Result, TytoError};
use crate::ontology::query::label_pattern;

/// Local matcher using the same equivalence rules as the SPARQL label query
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    insensitive: Regex,
    sensitive: Regex,
}

impl LabelMatcher {
    pub fn new(term: &str) -> Result<Self> {
        let pattern = label_pattern(term);
        let insensitive = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| TytoError::Query(format!("Invalid label pattern for '{}': {}", term, e)))?;
        let sensitive = Regex::new(&pattern)
            .map_err(|e| TytoError::Query(format!("Invalid label pattern for '{}': {}", term, e)))?;
        Ok(Self { insensitive, sensitive })
    }

    pub fn matches(&self, label: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.sensitive.is_match(label)
        } else {
            self.insensitive.is_match(label)
        }
    }

    /// Resolve `(uri, label)` candidates with the two-pass rule
    pub fn resolve(&self, term: &str, candidates: &[(String, String)]) -> Result<Option<String>> {
        let loose = distinct(
            candidates
                .iter()
                .filter(|(_, label)| self.matches(label, false))
                .map(|(uri, _)| uri.clone()),
        );
        disambiguate(term, loose, || {
            Ok(distinct(
                candidates
                    .iter()
                    .filter(|(_, label)| self.matches(label, true))
                    .map(|(uri, _)| uri.clone()),
            ))
        })
    }
}

/// Apply the two-pass rule given the case-insensitive hits and a way to
/// fetch the case-sensitive ones
pub fn disambiguate<F>(term: &str, insensitive: Vec<String>, case_sensitive: F) -> Result<Option<String>>
where
    F: FnOnce() -> Result<Vec<String>>,
{
    let mut insensitive = insensitive;
    match insensitive.len() {
        0 => Ok(None),
        1 => Ok(insensitive.pop()),
        _ => {
            let mut exact = case_sensitive()?;
            match exact.len() {
                0 => {
                    tracing::debug!(term, candidates = ?insensitive, "no case-sensitive match for ambiguous term");
                    Ok(None)
                }
                1 => Ok(exact.pop()),
                _ => Err(TytoError::AmbiguousTerm {
                    term: term.to_string(),
                    candidates: exact,
                }),
            }
        }
    }
}

/// Order-preserving de-duplication
pub fn distinct<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
