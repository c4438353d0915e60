// Dispatch Contract Tests
//
// These tests verify the fallback order of the Ontology dispatcher:
// resident graph first, then endpoints in configured order, then the graph
// loaded on demand. A backend failure never aborts the chain; ambiguity does.

use std::sync::Arc;

use tyto::{ClientConfig, OntologyBuilder, PubChemBackend, TytoError};

use crate::support::{call_log, entries, fixture, Scripted};

/// WHY: A resident graph answers without touching the network
/// REASON: Once the file is parsed, remote round-trips are pure overhead
/// BREAKS: Offline use and latency of every lookup after the first
#[test]
fn loaded_graph_answers_before_any_endpoint() {
    let log = call_log();
    let remote = Scripted::answering("remote", &log).shared();
    let so = OntologyBuilder::new("SO")
        .path(fixture("so_mini.owl"))
        .endpoint(remote.clone())
        .build()
        .unwrap();
    so.load().unwrap();

    assert_eq!(so.lookup("promoter").unwrap(), "http://purl.obolibrary.org/obo/SO_0000167");
    assert_eq!(
        so.term_for_uri("http://purl.obolibrary.org/obo/SO_0000110").unwrap(),
        "sequence_feature"
    );
    assert!(so.is_child_of("http://purl.obolibrary.org/obo/SO_0000167", "http://purl.obolibrary.org/obo/SO_0000001").unwrap());

    assert_eq!(remote.calls(), 0);
}

/// WHY: An unloaded graph is not parsed when an endpoint can answer
/// REASON: Parsing a large ontology file costs far more than one request
/// BREAKS: Startup latency for every process that only needs a few terms
#[test]
fn remote_answer_leaves_graph_unloaded() {
    let log = call_log();
    let remote = Scripted::answering("remote", &log).shared();
    let so = OntologyBuilder::new("SO")
        .path(fixture("so_mini.owl"))
        .endpoint(remote.clone())
        .build()
        .unwrap();

    assert_eq!(so.lookup("promoter").unwrap(), "http://remote.example.org/promoter");
    assert_eq!(remote.calls(), 1);
    assert!(!so.is_loaded());
}

/// WHY: The local file is the last resort when every endpoint comes up empty
/// REASON: Lookups must still succeed fully offline
/// BREAKS: Correctness whenever remote services are down or incomplete
#[test]
fn graph_loads_when_endpoints_find_nothing() {
    let log = call_log();
    let remote = Scripted::absent("remote", &log).shared();
    let so = OntologyBuilder::new("SO")
        .path(fixture("so_mini.owl"))
        .endpoint(remote.clone())
        .build()
        .unwrap();

    assert_eq!(so.lookup("terminator").unwrap(), "http://purl.obolibrary.org/obo/SO_0000141");
    assert_eq!(remote.calls(), 1);
    assert!(so.is_loaded());

    // Resident now: endpoints are only consulted when the graph has nothing
    so.lookup("region").unwrap();
    assert_eq!(remote.calls(), 1);
}

/// WHY: A resident graph that has no answer still falls through to endpoints
/// REASON: Remote sources may know terms newer than the local file
/// BREAKS: Lookups of terms added upstream after the file was shipped
#[test]
fn loaded_graph_absence_falls_through_to_endpoints() {
    let log = call_log();
    let remote = Scripted::answering("remote", &log).shared();
    let so = OntologyBuilder::new("SO")
        .path(fixture("so_mini.owl"))
        .endpoint(remote.clone())
        .build()
        .unwrap();
    so.load().unwrap();

    assert_eq!(so.lookup("brand_new_feature").unwrap(), "http://remote.example.org/brand_new_feature");
    assert_eq!(remote.calls(), 1);
}

/// WHY: Endpoints are consulted strictly in configured order
/// REASON: Order expresses preference (authoritative source first)
/// BREAKS: Deterministic results when sources disagree
#[test]
fn endpoints_are_tried_in_configured_order() {
    let log = call_log();
    let first = Scripted::absent("first", &log).shared();
    let second = Scripted::absent("second", &log).shared();
    let third = Scripted::answering("third", &log).shared();
    let fourth = Scripted::answering("fourth", &log).shared();
    let ontology = OntologyBuilder::new("ordered")
        .uri("http://example.org/ordered")
        .endpoint(first)
        .endpoint(second)
        .endpoint(third)
        .endpoint(fourth.clone())
        .build()
        .unwrap();

    assert_eq!(ontology.lookup("widget").unwrap(), "http://third.example.org/widget");
    assert_eq!(
        entries(&log),
        vec![
            "first:uri_for_term@http://example.org/ordered",
            "second:uri_for_term@http://example.org/ordered",
            "third:uri_for_term@http://example.org/ordered",
        ]
    );
    assert_eq!(fourth.calls(), 0);
}

/// WHY: One failing backend never aborts the dispatch chain
/// REASON: Remote services time out and return 5xx routinely
/// BREAKS: Every lookup while any single service is degraded
#[test]
fn failing_backend_is_skipped() {
    let log = call_log();
    let broken = Scripted::failing("broken", &log).shared();
    let healthy = Scripted::answering("healthy", &log).shared();
    let ontology = OntologyBuilder::new("resilient")
        .endpoint(broken.clone())
        .endpoint(healthy.clone())
        .build()
        .unwrap();

    assert_eq!(
        ontology.term_for_uri("http://example.org/x").unwrap(),
        "healthy term for http://example.org/x"
    );
    assert_eq!(broken.calls(), 1);
    assert_eq!(healthy.calls(), 1);
}

/// WHY: A misconfigured service fails its own requests, not the dispatch
/// REASON: One bad base URL in a manifest must not disable the other sources
/// BREAKS: Every lookup on an ontology with a single mistyped endpoint
#[test]
fn misconfigured_endpoint_is_skipped() {
    let log = call_log();
    let healthy = Scripted::answering("healthy", &log).shared();
    let ontology = OntologyBuilder::new("PubChem")
        .endpoint(Arc::new(PubChemBackend::with_base_url("not a url", &ClientConfig::default())))
        .endpoint(healthy.clone())
        .build()
        .unwrap();

    assert_eq!(ontology.lookup("salt").unwrap(), "http://healthy.example.org/salt");
    assert_eq!(healthy.calls(), 1);
}

/// WHY: Every source failing is a lookup failure carrying the caller's input
/// REASON: Callers need the original input, not a backend error, to report
/// BREAKS: Error messages and error matching in callers
#[test]
fn exhausted_chain_reports_original_input() {
    let log = call_log();
    let ontology = OntologyBuilder::new("down")
        .endpoint(Scripted::failing("a", &log).shared())
        .endpoint(Scripted::absent("b", &log).shared())
        .build()
        .unwrap();

    match ontology.uri_for_term("not_a_term") {
        Err(TytoError::LookupFailed { input, .. }) => assert_eq!(input, "not_a_term"),
        other => panic!("Expected LookupFailed, got {:?}", other),
    }
}

/// WHY: Ambiguity stops the chain and reaches the caller
/// REASON: Picking a candidate from a later source would hide a real conflict
/// BREAKS: Semantic correctness of term resolution
#[test]
fn ambiguity_propagates_immediately() {
    let log = call_log();
    let ambiguous = Scripted::ambiguous("ambiguous", &log).shared();
    let fallback = Scripted::answering("fallback", &log).shared();
    let ontology = OntologyBuilder::new("conflicted")
        .path(fixture("so_mini.owl"))
        .endpoint(ambiguous)
        .endpoint(fallback.clone())
        .build()
        .unwrap();

    match ontology.lookup("widget") {
        Err(TytoError::AmbiguousTerm { candidates, .. }) => assert_eq!(candidates.len(), 2),
        other => panic!("Expected AmbiguousTerm, got {:?}", other),
    }
    assert_eq!(fallback.calls(), 0);
    assert!(!ontology.is_loaded());
}

/// WHY: A definite "no" from a source is an answer, not an absence
/// REASON: Relationship checks must not load the graph just to confirm false
/// BREAKS: Cost of negative hierarchy checks
#[test]
fn negative_relationship_answer_is_final() {
    let log = call_log();
    let remote = Scripted::absent("remote", &log).with_child_answer(false).shared();
    let so = OntologyBuilder::new("SO")
        .path(fixture("so_mini.owl"))
        .endpoint(remote.clone())
        .build()
        .unwrap();

    assert!(!so.is_child_of("http://purl.obolibrary.org/obo/SO_0000167", "http://purl.obolibrary.org/obo/SO_0000001").unwrap());
    assert!(!so.is_loaded());

    // Absent relationship answers still reach the graph
    let silent = Scripted::absent("silent", &log).shared();
    let so = OntologyBuilder::new("SO")
        .path(fixture("so_mini.owl"))
        .endpoint(silent)
        .build()
        .unwrap();
    assert!(so.is_child_of("http://purl.obolibrary.org/obo/SO_0000167", "http://purl.obolibrary.org/obo/SO_0000001").unwrap());
    assert!(so.is_loaded());
}

/// WHY: One endpoint instance serves many ontologies, scoped per call
/// REASON: Remote connectors are shared process-wide
/// BREAKS: Queries leaking into the wrong ontology's graph
#[test]
fn shared_endpoint_receives_owning_ontology() {
    let log = call_log();
    let shared = Scripted::answering("shared", &log).shared();
    let so = OntologyBuilder::new("SO")
        .uri("http://purl.obolibrary.org/obo/so.owl")
        .endpoint(shared.clone())
        .build()
        .unwrap();
    let ncit = OntologyBuilder::new("NCIT")
        .uri("http://purl.obolibrary.org/obo/ncit.owl")
        .endpoint(shared.clone())
        .build()
        .unwrap();

    so.lookup("promoter").unwrap();
    ncit.lookup("gene").unwrap();
    assert_eq!(
        entries(&log),
        vec![
            "shared:uri_for_term@http://purl.obolibrary.org/obo/so.owl",
            "shared:uri_for_term@http://purl.obolibrary.org/obo/ncit.owl",
        ]
    );
    assert_eq!(Arc::strong_count(&shared), 3);
}

/// WHY: Concurrent first lookups share a single graph load
/// REASON: Two callers must never observe a half-loaded store
/// BREAKS: Thread safety of lazily loaded ontologies
#[test]
fn concurrent_lookups_share_one_load() {
    let so = OntologyBuilder::new("SO").path(fixture("so_mini.owl")).build().unwrap();

    let results: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| so.lookup("promoter").map(String::from)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    assert!(results.iter().all(|r| r == "http://purl.obolibrary.org/obo/SO_0000167"));
    assert!(so.is_loaded());
}
