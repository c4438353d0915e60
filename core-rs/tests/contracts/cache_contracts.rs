// Cache Contract Tests
//
// These tests verify the lookup memo owned by each Ontology: bounded LRU,
// keyed by the sanitized argument, successes only, fully reset on resize.

use tyto::{OntologyBuilder, TytoError};

use crate::support::{call_log, Scripted};

/// WHY: Capacity 1 keeps only the most recent lookup
/// REASON: The bound is a hard memory limit, not a hint
/// BREAKS: Memory use of long-running processes
#[test]
fn capacity_one_keeps_latest_only() {
    let log = call_log();
    let remote = Scripted::answering("remote", &log).shared();
    let ontology = OntologyBuilder::new("tiny")
        .endpoint(remote.clone())
        .cache_capacity(1)
        .build()
        .unwrap();

    ontology.lookup("first").unwrap();
    ontology.lookup("second").unwrap();
    assert_eq!(remote.calls(), 2);

    ontology.lookup("second").unwrap();
    assert_eq!(remote.calls(), 2, "latest entry is served from cache");

    ontology.lookup("first").unwrap();
    assert_eq!(remote.calls(), 3, "earlier entry was evicted");
}

/// WHY: Cache keys are sanitized arguments
/// REASON: Spelling variants of one term resolve to one native label
/// BREAKS: Hit rate for underscore/space variants
#[test]
fn spelling_variants_share_an_entry() {
    let log = call_log();
    let remote = Scripted::answering("remote", &log).shared();
    let ontology = OntologyBuilder::new("variants").endpoint(remote.clone()).build().unwrap();

    let a = ontology.lookup("inducible_promoter").unwrap();
    let b = ontology.lookup("inducible promoter").unwrap();
    assert_eq!(a, b);
    assert_eq!(remote.calls(), 1);
}

/// WHY: Failed lookups are never memoized
/// REASON: A transient outage must not poison later lookups
/// BREAKS: Recovery after a remote service comes back
#[test]
fn failures_are_not_cached() {
    let log = call_log();
    let remote = Scripted::absent("remote", &log).shared();
    let ontology = OntologyBuilder::new("absent").endpoint(remote.clone()).build().unwrap();

    assert!(matches!(ontology.lookup("ghost"), Err(TytoError::LookupFailed { .. })));
    assert!(matches!(ontology.lookup("ghost"), Err(TytoError::LookupFailed { .. })));
    assert_eq!(remote.calls(), 2);
}

/// WHY: Reconfiguring discards every entry
/// REASON: Resizing replaces the memo instead of layering a second one
/// BREAKS: Stale answers surviving a reconfiguration
#[test]
fn reconfigure_discards_entries() {
    let log = call_log();
    let remote = Scripted::answering("remote", &log).shared();
    let ontology = OntologyBuilder::new("resized").endpoint(remote.clone()).build().unwrap();

    ontology.term_for_uri("http://example.org/a").unwrap();
    ontology.term_for_uri("http://example.org/a").unwrap();
    assert_eq!(remote.calls(), 1);

    ontology.configure_cache_size(5);
    assert_eq!(ontology.cache_capacity(), 5);
    ontology.term_for_uri("http://example.org/a").unwrap();
    assert_eq!(remote.calls(), 2);

    ontology.configure_cache_size(0);
    ontology.term_for_uri("http://example.org/a").unwrap();
    ontology.term_for_uri("http://example.org/a").unwrap();
    assert_eq!(remote.calls(), 4, "capacity 0 disables memoization");
}

/// WHY: Term and URI lookups are memoized independently
/// REASON: The two directions have different keys and values
/// BREAKS: A term lookup answering a URI lookup with the same text
#[test]
fn directions_do_not_share_entries() {
    let log = call_log();
    let remote = Scripted::answering("remote", &log).shared();
    let ontology = OntologyBuilder::new("both").endpoint(remote.clone()).build().unwrap();

    ontology.lookup("widget").unwrap();
    ontology.term_for_uri("widget").unwrap();
    assert_eq!(remote.calls(), 2);
}
