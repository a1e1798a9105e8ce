//! Integration test: run the `ncs` binary end to end against the
//! repository catalog and scratch copies of it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn schema_dir() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop();
    dir.pop();
    dir.join("schemas")
}

fn ncs(schema_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ncs"))
        .arg("--schema-dir")
        .arg(schema_dir)
        .args(args)
        .env_remove("NCS_SCHEMA_DIR")
        .env_remove("NCS_CATALOG_FILE")
        .env_remove("NCS_URI_BASE")
        .output()
        .expect("failed to run ncs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn validate_passes_and_fails_with_exit_codes() {
    let ok = ncs(
        &schema_dir(),
        &["validate", "notecard.api.json", "--json", r#"{"req":"card.random","count":5}"#],
    );
    assert_eq!(ok.status.code(), Some(0), "{}", stdout(&ok));
    assert!(stdout(&ok).starts_with("PASS"));

    let bad = ncs(
        &schema_dir(),
        &[
            "validate",
            "card.random.req.notecard.api.json",
            "--all-errors",
            "--json",
            r#"{"req":"card.random","bogus":1}"#,
        ],
    );
    assert_eq!(bad.status.code(), Some(1));
    let out = stdout(&bad);
    assert!(out.starts_with("FAIL"));
    assert!(out.contains("bogus"), "{out}");
}

#[test]
fn check_passes_on_repository_catalog() {
    let output = ncs(&schema_dir(), &["check"]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    assert!(stdout(&output).contains("Catalog: 5 reference(s), 5 request file(s)"));
}

#[test]
fn new_then_check_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    for entry in std::fs::read_dir(schema_dir()).unwrap() {
        let path = entry.unwrap().path();
        std::fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }

    let created = ncs(dir.path(), &["new", "card.example"]);
    assert_eq!(created.status.code(), Some(0), "{}", stdout(&created));

    let again = ncs(dir.path(), &["new", "card.example"]);
    assert_eq!(again.status.code(), Some(1));

    let check = ncs(dir.path(), &["check"]);
    assert_eq!(check.status.code(), Some(0), "{}", stdout(&check));
    assert!(stdout(&check).contains("Catalog: 6 reference(s), 6 request file(s)"));
}

#[test]
fn empty_schema_dir_variable_still_discovers_repository() {
    let output = Command::new(env!("CARGO_BIN_EXE_ncs"))
        .arg("check")
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("NCS_SCHEMA_DIR", "")
        .env_remove("NCS_CATALOG_FILE")
        .env_remove("NCS_URI_BASE")
        .output()
        .expect("failed to run ncs");
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    assert!(stdout(&output).contains("Catalog: 5 reference(s), 5 request file(s)"));
}

#[test]
fn docs_to_stdout() {
    let output = ncs(&schema_dir(), &["docs", "--output", "-"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("### `card.version`"));
}

#[test]
fn version_rejects_bad_target() {
    let dir = tempfile::tempdir().unwrap();
    let output = ncs(
        dir.path(),
        &["version", "--property", "version", "--target-version", "1.2"],
    );
    assert_eq!(output.status.code(), Some(1));
}
