//! Integration test: resolve the real catalog in `schemas/` and validate
//! requests through it.
//!
//! Covers the catalog-level guarantees:
//!
//! 1. Every catalog `$ref` has a local request file and vice versa.
//! 2. The catalog resolves its own `$id` and every satellite locally.
//! 3. Building the registry twice gives the same result.
//! 4. Deleting one satellite only disables that request.

use std::path::{Path, PathBuf};

use ncs_core::SCHEMA_URI_BASE;
use ncs_schema::{
    audit_catalog, build_registry, check_consistency, compile, resolve_schema, LocalResolver,
    SchemaStore, ValidationMode, ViolationKind,
};
use serde_json::json;

/// Compute the repo root from the crate manifest directory.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/ncs-schema -> crates -> repo root
    dir.pop();
    dir.pop();
    dir
}

fn schema_dir() -> PathBuf {
    repo_root().join("schemas")
}

const CATALOG: &str = "notecard.api.json";

#[test]
fn catalog_and_request_files_match() {
    let store = SchemaStore::new(schema_dir());
    let catalog = store.load(CATALOG).unwrap();
    let report = check_consistency(&catalog, &store).unwrap();
    assert!(report.is_consistent(), "{report:?}");
    assert_eq!(report.referenced, 5);
    assert_eq!(report.request_files, 5);
}

#[test]
fn catalog_resolves_itself_and_every_satellite() {
    let store = SchemaStore::new(schema_dir());
    let resolved = resolve_schema(&store, CATALOG).unwrap();

    let own_id = format!("{SCHEMA_URI_BASE}{CATALOG}");
    assert_eq!(resolved.document.identity(), Some(own_id.as_str()));
    assert_eq!(resolved.registry.get(&own_id), Some(&resolved.document));
    for uri in resolved.document.references() {
        assert!(resolved.registry.contains(uri), "{uri} should resolve");
    }
    assert!(resolved.registry.skipped().is_empty());
    // Identities equal the catalog URIs, so there are no aliases.
    assert_eq!(resolved.registry.len(), 6);
}

#[test]
fn catalog_reference_into_its_own_defs_validates() {
    let store = SchemaStore::new(schema_dir());
    let mut body = store.load(CATALOG).unwrap().into_body();
    let own_id = format!("{SCHEMA_URI_BASE}{CATALOG}");
    body["$defs"] = json!({
        "ping": {
            "type": "object",
            "properties": {"req": {"const": "test.ping"}},
            "required": ["req"],
            "additionalProperties": false
        }
    });
    body["oneOf"]
        .as_array_mut()
        .unwrap()
        .push(json!({"$ref": format!("{own_id}#/$defs/ping")}));
    let root = ncs_schema::SchemaDocument::from_value(CATALOG, body);

    let registry = build_registry(&root, &LocalResolver::new(&store)).unwrap();
    assert_eq!(registry.len(), 6);
    assert!(registry.skipped().is_empty());

    let schema = compile(&root, &registry).unwrap();
    assert!(schema.is_valid(&json!({"req": "test.ping"})));
    assert!(schema.is_valid(&json!({"req": "card.random"})));
    assert!(!schema.is_valid(&json!({"req": "test.pong"})));
}

#[test]
fn registry_build_is_idempotent() {
    let store = SchemaStore::with_cache(schema_dir());
    let first = resolve_schema(&store, CATALOG).unwrap();
    let second = resolve_schema(&store, CATALOG).unwrap();
    assert_eq!(first.registry, second.registry);
    assert_eq!(
        first.registry.uris().collect::<Vec<_>>(),
        second.registry.uris().collect::<Vec<_>>()
    );
}

#[test]
fn catalog_dispatches_each_request() {
    let store = SchemaStore::new(schema_dir());
    let resolved = resolve_schema(&store, CATALOG).unwrap();
    let catalog = compile(&resolved.document, &resolved.registry).unwrap();

    for req in [
        "card.binary.get",
        "card.led",
        "card.random",
        "card.time",
        "card.version",
    ] {
        assert!(catalog.is_valid(&json!({ "req": req })), "{req} via req");
        assert!(catalog.is_valid(&json!({ "cmd": req })), "{req} via cmd");
    }
    assert!(catalog.is_valid(&json!({"req": "card.led", "mode": "red", "on": true})));
}

#[test]
fn catalog_rejects_unknown_and_empty_requests() {
    let store = SchemaStore::new(schema_dir());
    let resolved = resolve_schema(&store, CATALOG).unwrap();
    let catalog = compile(&resolved.document, &resolved.registry).unwrap();

    for instance in [json!({}), json!({"req": "card.nonexistent"})] {
        let err = catalog
            .validate(&instance, ValidationMode::FirstError)
            .unwrap_err();
        assert_eq!(err.violations()[0].kind, ViolationKind::NoMatchingBranch);
    }
}

fn copy_schemas(to: &Path) {
    for entry in std::fs::read_dir(schema_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.is_file() {
            std::fs::copy(&path, to.join(path.file_name().unwrap())).unwrap();
        }
    }
}

#[test]
fn deleted_satellite_degrades_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    copy_schemas(dir.path());
    std::fs::remove_file(dir.path().join("card.led.req.notecard.api.json")).unwrap();

    let store = SchemaStore::new(dir.path());
    let resolved = resolve_schema(&store, CATALOG).unwrap();
    let led_uri = format!("{SCHEMA_URI_BASE}card.led.req.notecard.api.json");
    assert!(resolved.registry.is_skipped(&led_uri));
    assert_eq!(resolved.registry.skipped().len(), 1);

    let catalog = compile(&resolved.document, &resolved.registry).unwrap();
    assert!(catalog.is_valid(&json!({"req": "card.random"})));
    assert!(catalog.is_valid(&json!({"req": "card.time"})));
    let err = catalog
        .validate(&json!({"req": "card.led"}), ValidationMode::FirstError)
        .unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::NoMatchingBranch);

    let report = check_consistency(&resolved.document, &store).unwrap();
    assert_eq!(report.dangling, ["card.led.req.notecard.api.json"]);
    assert_eq!(report.orphans, Vec::<String>::new());
}

#[test]
fn corrupt_satellite_is_a_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    copy_schemas(dir.path());
    std::fs::write(dir.path().join("card.time.req.notecard.api.json"), "{ \"type\": ").unwrap();

    let store = SchemaStore::new(dir.path());
    let err = resolve_schema(&store, CATALOG).unwrap_err();
    assert!(
        err.to_string().contains("card.time.req.notecard.api.json"),
        "{err}"
    );
}

#[test]
fn every_schema_and_sample_passes_audit() {
    let store = SchemaStore::new(schema_dir());
    let report = audit_catalog(&store, CATALOG).unwrap();
    assert!(report.passed(), "findings: {:#?}", report.findings);
    assert_eq!(report.schemas_checked, 11);
    assert!(report.samples_checked >= 10);
}

#[test]
fn satellites_compile_standalone() {
    let store = SchemaStore::new(schema_dir());
    for name in store.list().unwrap() {
        let doc = store.load(&name).unwrap();
        let registry = build_registry(&doc, &LocalResolver::new(&store)).unwrap();
        compile(&doc, &registry).unwrap_or_else(|e| panic!("{name}: {e}"));
    }
}
