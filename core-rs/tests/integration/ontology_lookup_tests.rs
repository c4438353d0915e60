//! Integration tests for ontology lookups over local graphs
//!
//! Tests the full lookup path including:
//! - Sanitization (identifiers.org <-> native namespaces, term spelling)
//! - Lazy graph loading
//! - Term disambiguation
//! - Class hierarchy queries
//!
//! Builtin definitions are pointed at the small fixtures under
//! `core-rs/tests/fixtures` and stripped of remote endpoints.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tyto::ontology::builtin_definitions;
use tyto::{ClientConfig, Ontology, OntologyBuilder, TytoError};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("core-rs/tests/fixtures")
        .join(name)
}

/// Builtin definition backed by a fixture file, offline
fn offline_builtin(name: &str, file: &str) -> Ontology {
    let definition = builtin_definitions()
        .into_iter()
        .find(|d| d.name == name)
        .unwrap()
        .without_endpoints()
        .with_path(fixture(file));
    Ontology::from_definition(&definition, Path::new("/"), &ClientConfig::default()).unwrap()
}

fn ambiguous() -> Ontology {
    OntologyBuilder::new("AMB")
        .path(fixture("ambiguous.ttl"))
        .uri("http://example.org/amb")
        .build()
        .unwrap()
}

#[test]
fn test_sequence_feature_round_trip() {
    let so = offline_builtin("SO", "so_mini.owl");
    assert!(!so.is_loaded());

    let uri = so.uri_for_term("sequence_feature").unwrap();
    assert_eq!(uri, "https://identifiers.org/SO:0000110");
    assert!(so.is_loaded());

    let term = so.term_for_uri(&uri).unwrap();
    assert_eq!(term, "sequence_feature");
    assert_eq!(term.native_uri(), "http://purl.obolibrary.org/obo/SO_0000110");
    assert_eq!(term.uri(), "https://identifiers.org/SO:0000110");
}

#[test]
fn test_term_spelling_variants_resolve_alike() {
    let so = offline_builtin("SO", "so_mini.owl");
    let expected = "https://identifiers.org/SO:0002050";
    assert_eq!(so.lookup("inducible_promoter").unwrap(), expected);
    assert_eq!(so.lookup("inducible promoter").unwrap(), expected);
    assert_eq!(so.lookup("Inducible-Promoter").unwrap(), expected);
    assert_eq!(tyto::term!(so, inducible_promoter).unwrap(), expected);
}

#[test]
fn test_deprecated_identifiers_namespace() {
    let so = offline_builtin("SO", "so_mini.owl");
    let term = so.term_for_uri("http://identifiers.org/so/SO:0000167").unwrap();
    assert_eq!(term, "promoter");
}

#[test]
fn test_unknown_term_is_lookup_failure() {
    let so = offline_builtin("SO", "so_mini.owl");
    match so.uri_for_term("not_a_term") {
        Err(TytoError::LookupFailed { input, message }) => {
            assert_eq!(input, "not_a_term");
            assert_eq!(message, "not_a_term is not a valid ontology term");
        }
        other => panic!("Expected LookupFailed, got {:?}", other),
    }

    match so.term_for_uri("https://identifiers.org/SO:9999999") {
        Err(TytoError::LookupFailed { message, .. }) => {
            assert_eq!(message, "No matching term found for https://identifiers.org/SO:9999999");
        }
        other => panic!("Expected LookupFailed, got {:?}", other),
    }
}

#[test]
fn test_sbo_turtle_round_trip() {
    let sbo = offline_builtin("SBO", "sbo_mini.ttl");
    let reactant = sbo.lookup("reactant").unwrap();
    assert_eq!(reactant, "https://identifiers.org/SBO:0000010");
    assert_eq!(reactant.term().unwrap(), "reactant");

    let root = sbo.lookup("systems_biology_representation").unwrap();
    assert_eq!(root, "https://identifiers.org/SBO:0000000");
    assert!(reactant.is_a(&root).unwrap());
}

#[test]
fn test_om_spelling_aliases() {
    let om = offline_builtin("OM", "om_mini.rdf");
    let litre = om.lookup("liter").unwrap();
    assert_eq!(litre, "http://www.ontology-of-units-of-measure.org/resource/om-2/litre");
    assert_eq!(om.lookup("litre").unwrap(), litre);
    assert_eq!(litre.term().unwrap(), "liter");

    assert_eq!(om.lookup("meter").unwrap(), "http://www.ontology-of-units-of-measure.org/resource/om-2/metre");
    assert_eq!(
        om.lookup("molar").unwrap(),
        "http://www.ontology-of-units-of-measure.org/resource/om-2/molePerLitre"
    );
}

#[test]
fn test_english_label_preferred() {
    let om = offline_builtin("OM", "om_mini.rdf");
    let term = om
        .term_for_uri("http://www.ontology-of-units-of-measure.org/resource/om-2/hour")
        .unwrap();
    assert_eq!(term, "hour");
}

#[test]
fn test_hierarchy_transitivity() {
    let so = offline_builtin("SO", "so_mini.owl");
    let inducible = so.lookup("inducible_promoter").unwrap();
    let promoter = so.lookup("promoter").unwrap();
    let region = so.lookup("region").unwrap();
    let feature = so.lookup("sequence_feature").unwrap();

    assert!(inducible.is_descendant_of(&promoter).unwrap());
    assert!(promoter.is_descendant_of(&region).unwrap());
    assert!(inducible.is_descendant_of(&region).unwrap());
    assert!(inducible.is_descendant_of(&feature).unwrap());

    // Converse relation
    assert!(region.is_ancestor_of(&inducible).unwrap());
    assert!(!inducible.is_ancestor_of(&region).unwrap());
    assert!(feature.is_supertype_of(&promoter).unwrap());
    assert!(promoter.is_subtype_of(&feature).unwrap());
}

#[test]
fn test_child_of_is_strict() {
    let so = offline_builtin("SO", "so_mini.owl");
    let inducible = so.lookup("inducible_promoter").unwrap();
    let promoter = so.lookup("promoter").unwrap();
    let region = so.lookup("region").unwrap();

    assert!(inducible.is_child_of(&promoter).unwrap());
    assert!(promoter.is_parent_of(&inducible).unwrap());
    assert!(!inducible.is_child_of(&region).unwrap());
    assert!(inducible.is_descendant_of(&region).unwrap());
}

#[test]
fn test_relationship_accepts_plain_strings() {
    let so = offline_builtin("SO", "so_mini.owl");
    let promoter = so.lookup("promoter").unwrap();
    assert!(promoter.is_a("https://identifiers.org/SO:0000110").unwrap());
    assert!(promoter.is_a("https://identifiers.org/SO:0000167").unwrap());
    assert!(!promoter.is_a("https://identifiers.org/SO:0000141").unwrap());
}

#[test]
fn test_enumerations() {
    let so = offline_builtin("SO", "so_mini.owl");
    let promoter = so.lookup("promoter").unwrap();

    // The part_of restriction is a blank node and is not reported
    let parents = promoter.get_parents().unwrap();
    assert_eq!(parents, vec!["https://identifiers.org/SO:0000001"]);

    let region = so.lookup("region").unwrap();
    let children: HashSet<String> = region.get_children().unwrap().into_iter().map(String::from).collect();
    assert_eq!(
        children,
        HashSet::from([
            "https://identifiers.org/SO:0000167".to_string(),
            "https://identifiers.org/SO:0000141".to_string(),
        ])
    );

    let descendants = region.get_descendants().unwrap();
    assert_eq!(descendants.len(), 3);
    assert!(descendants.iter().any(|d| d == "https://identifiers.org/SO:0002050"));

    let inducible = so.lookup("inducible_promoter").unwrap();
    let ancestors = inducible.get_ancestors().unwrap();
    assert_eq!(ancestors.len(), 3);
    assert!(ancestors.contains(&so.lookup("sequence_feature").unwrap()));

    assert!(so.lookup("sequence_feature").unwrap().get_parents().unwrap().is_empty());
}

#[test]
fn test_get_ontologies() {
    let so = offline_builtin("SO", "so_mini.owl");
    let ontologies = so.get_ontologies().unwrap();
    assert_eq!(
        ontologies.get("http://purl.obolibrary.org/obo/so.owl").map(String::as_str),
        Some("Sequence types and features ontology")
    );

    let sbo = offline_builtin("SBO", "sbo_mini.ttl");
    assert_eq!(
        sbo.get_ontologies().unwrap().get("http://biomodels.net/SBO/").map(String::as_str),
        Some("Systems Biology Ontology")
    );
}

#[test]
fn test_case_sensitive_pass_breaks_tie() {
    let amb = ambiguous();
    assert_eq!(amb.lookup("widget").unwrap(), "http://example.org/amb#widgetPart");
    assert_eq!(amb.lookup("Widget").unwrap(), "http://example.org/amb#WidgetClass");
    // Ambiguous case-insensitively, no exact casing: absent
    assert!(matches!(amb.lookup("WIDGET"), Err(TytoError::LookupFailed { .. })));
}

#[test]
fn test_ambiguous_term_lists_candidates() {
    let amb = ambiguous();
    match amb.lookup("gadget") {
        Err(TytoError::AmbiguousTerm { term, candidates }) => {
            assert_eq!(term, "gadget");
            let candidates: HashSet<String> = candidates.into_iter().collect();
            assert_eq!(
                candidates,
                HashSet::from([
                    "http://example.org/amb#gadgetA".to_string(),
                    "http://example.org/amb#gadgetB".to_string(),
                ])
            );
        }
        other => panic!("Expected AmbiguousTerm, got {:?}", other),
    }
}

#[test]
fn test_named_individuals() {
    let amb = ambiguous();
    let class = amb.lookup("Widget").unwrap();
    let instances = class.get_instances().unwrap();
    assert_eq!(instances, vec!["http://example.org/amb#myWidget"]);
    assert!(instances[0].is_instance().unwrap());
    assert!(!class.is_instance().unwrap());

    let term = amb.term_for_uri("http://example.org/amb#myWidget").unwrap();
    assert_eq!(term, "my widget");
    assert!(term.is_instance().unwrap());
}

#[test]
fn test_construction_requires_a_source() {
    match OntologyBuilder::new("nothing").uri("http://example.org/nothing").build() {
        Err(TytoError::Configuration(message)) => assert!(message.contains("nothing")),
        other => panic!("Expected Configuration error, got {:?}", other.map(|o| o.name().to_string())),
    }
}

#[test]
fn test_missing_file_exhausts_chain() {
    let ontology = OntologyBuilder::new("gone").path(fixture("does_not_exist.owl")).build().unwrap();
    assert!(matches!(ontology.lookup("promoter"), Err(TytoError::LookupFailed { .. })));
    assert!(!ontology.is_loaded());
}
