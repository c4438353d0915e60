//! URI and term rewriting between public and native conventions
//!
//! Callers speak in public identifiers (identifiers.org URIs, underscore
//! separated labels). Backends speak the ontology's native form. A
//! [`Sanitizer`] is fixed at construction and translates both ways.

use crate::config::SanitizeRules;

/// Bidirectional rewriting applied around every lookup
pub trait Sanitizer: Send + Sync {
    /// Public URI -> native URI
    fn sanitize_uri(&self, uri: &str) -> String {
        uri.to_string()
    }

    /// Native URI -> public URI
    fn reverse_sanitize_uri(&self, uri: &str) -> String {
        uri.to_string()
    }

    /// Caller term -> native label
    fn sanitize_term(&self, term: &str) -> String {
        term.replace('_', " ")
    }

    /// Native label -> caller term
    fn reverse_sanitize_term(&self, term: &str) -> String {
        term.to_string()
    }
}

/// Identity URIs, underscores read as spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSanitizer;

impl Sanitizer for DefaultSanitizer {}

/// Optional function hooks; unset hooks keep the default behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizeHooks {
    pub sanitize_uri: Option<fn(&str) -> String>,
    pub reverse_sanitize_uri: Option<fn(&str) -> String>,
    pub sanitize_term: Option<fn(&str) -> String>,
    pub reverse_sanitize_term: Option<fn(&str) -> String>,
}

impl Sanitizer for SanitizeHooks {
    fn sanitize_uri(&self, uri: &str) -> String {
        match self.sanitize_uri {
            Some(hook) => hook(uri),
            None => uri.to_string(),
        }
    }

    fn reverse_sanitize_uri(&self, uri: &str) -> String {
        match self.reverse_sanitize_uri {
            Some(hook) => hook(uri),
            None => uri.to_string(),
        }
    }

    fn sanitize_term(&self, term: &str) -> String {
        match self.sanitize_term {
            Some(hook) => hook(term),
            None => term.replace('_', " "),
        }
    }

    fn reverse_sanitize_term(&self, term: &str) -> String {
        match self.reverse_sanitize_term {
            Some(hook) => hook(term),
            None => term.to_string(),
        }
    }
}

/// Sanitizer driven by manifest rules
#[derive(Debug, Clone, Default)]
pub struct RuleSanitizer {
    rules: SanitizeRules,
}

impl RuleSanitizer {
    pub fn new(rules: SanitizeRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &SanitizeRules {
        &self.rules
    }
}

impl Sanitizer for RuleSanitizer {
    fn sanitize_uri(&self, uri: &str) -> String {
        for namespace in &self.rules.uri_namespaces {
            if namespace.public.iter().any(|p| uri.contains(p.as_str())) {
                return multi_replace(uri, &namespace.public, &namespace.native);
            }
        }
        uri.to_string()
    }

    /// Native URIs go back to the first public namespace listed
    fn reverse_sanitize_uri(&self, uri: &str) -> String {
        for namespace in &self.rules.uri_namespaces {
            if let Some(public) = namespace.public.first() {
                if !namespace.native.is_empty() && uri.contains(namespace.native.as_str()) {
                    return uri.replace(namespace.native.as_str(), public);
                }
            }
        }
        uri.to_string()
    }

    fn sanitize_term(&self, term: &str) -> String {
        match &self.rules.term_replacements {
            Some(replacements) => apply_replacements(term, replacements),
            None => term.replace('_', " "),
        }
    }

    fn reverse_sanitize_term(&self, term: &str) -> String {
        apply_replacements(term, &self.rules.reverse_term_replacements)
    }
}

fn apply_replacements(text: &str, replacements: &[(String, String)]) -> String {
    replacements
        .iter()
        .filter(|(from, _)| !from.is_empty())
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

/// Replace the first of `old_namespaces` found in `target` with
/// `new_namespace`; `target` is returned unchanged when none occurs
pub fn multi_replace<S: AsRef<str>>(target: &str, old_namespaces: &[S], new_namespace: &str) -> String {
    for namespace in old_namespaces {
        let namespace = namespace.as_ref();
        if !namespace.is_empty() && target.contains(namespace) {
            return target.replace(namespace, new_namespace);
        }
    }
    target.to_string()
}
