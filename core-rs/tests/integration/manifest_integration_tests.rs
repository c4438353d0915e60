//! Integration tests for manifest-defined ontologies
//!
//! Tests the manifest path end to end:
//! - YAML parsing and relative path resolution
//! - Sanitization rules from YAML
//! - Configuration errors for malformed definitions

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use tyto::{ClientConfig, OntologyManifest, OntologyRegistry, TytoError};

fn copy_fixture(dir: &Path, name: &str) {
    let source = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("core-rs/tests/fixtures")
        .join(name);
    fs::copy(source, dir.join(name)).unwrap();
}

const MANIFEST: &str = r#"
ontologies:
  - name: MySO
    path: so_mini.owl
    uri: http://purl.obolibrary.org/obo/so.owl
    sanitize:
      uriNamespaces:
        - public: ["https://identifiers.org/SO:", "http://identifiers.org/so/SO:"]
          native: http://purl.obolibrary.org/obo/SO_
  - name: Units
    path: om_mini.rdf
    sanitize:
      termReplacements: [["liter", "litre"], ["_", " "]]
      reverseTermReplacements: [["litre", "liter"]]
"#;

fn manifest_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    copy_fixture(temp_dir.path(), "so_mini.owl");
    copy_fixture(temp_dir.path(), "om_mini.rdf");
    fs::write(temp_dir.path().join("tyto.yaml"), MANIFEST).unwrap();
    temp_dir
}

#[test]
fn test_manifest_ontologies_resolve_terms() {
    let temp_dir = manifest_dir();
    let manifest = OntologyManifest::load(&temp_dir.path().join("tyto.yaml")).unwrap();
    let registry = OntologyRegistry::from_manifest(&manifest, &ClientConfig::default()).unwrap();

    assert_eq!(registry.names(), vec!["MySO", "Units"]);

    let so = registry.get("myso").unwrap();
    assert_eq!(so.graph().unwrap().path(), temp_dir.path().join("so_mini.owl"));

    let promoter = so.lookup("promoter").unwrap();
    assert_eq!(promoter, "https://identifiers.org/SO:0000167");
    assert_eq!(promoter.term().unwrap(), "promoter");

    let units = registry.get("Units").unwrap();
    let litre = units.lookup("liter").unwrap();
    assert_eq!(litre.term().unwrap(), "liter");
}

#[test]
fn test_manifest_cache_size_applies_to_all() {
    let temp_dir = manifest_dir();
    let manifest = OntologyManifest::load(&temp_dir.path().join("tyto.yaml")).unwrap();
    let config = ClientConfig {
        cache_capacity: 3,
        ..ClientConfig::default()
    };
    let registry = OntologyRegistry::from_manifest(&manifest, &config).unwrap();
    assert!(registry.iter().all(|o| o.cache_capacity() == 3));

    registry.configure_cache_size(7);
    assert!(registry.iter().all(|o| o.cache_capacity() == 7));
}

#[test]
fn test_unknown_endpoint_is_configuration_error() {
    let manifest = OntologyManifest::from_yaml(
        "ontologies:\n  - name: Bad\n    uri: http://example.org/bad\n    endpoints: [gopher]\n",
    )
    .unwrap();
    let err = OntologyRegistry::from_manifest(&manifest, &ClientConfig::default()).unwrap_err();
    assert!(matches!(err, TytoError::Configuration(_)));
}

#[test]
fn test_definition_without_source_is_configuration_error() {
    let manifest = OntologyManifest::from_yaml("ontologies:\n  - name: Empty\n    uri: http://example.org/e\n").unwrap();
    let err = OntologyRegistry::from_manifest(&manifest, &ClientConfig::default()).unwrap_err();
    assert!(matches!(err, TytoError::Configuration(_)));
}

#[test]
fn test_custom_sparql_endpoint_is_accepted() {
    let manifest = OntologyManifest::from_yaml(
        "ontologies:\n  - name: Remote\n    uri: http://example.org/r\n    endpoints: [\"sparql:https://sparql.example.org/query\", ontobee]\n",
    )
    .unwrap();
    let registry = OntologyRegistry::from_manifest(&manifest, &ClientConfig::default()).unwrap();
    let remote = registry.get("Remote").unwrap();

    let names: Vec<&str> = remote.endpoints().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["https://sparql.example.org/query", "Ontobee"]);
    assert!(remote.graph().is_none());
}
