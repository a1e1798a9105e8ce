//! # Validate Subcommand
//!
//! Validates one JSON or YAML instance against a fully resolved schema from
//! the catalog. Every `$ref` is answered from local files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use ncs_schema::{
    compile, load_instance, resolve_schema, CatalogConfig, SchemaValidationError, ValidationMode,
};

/// Arguments for the `ncs validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file name, e.g. `card.random.req.notecard.api.json` or the
    /// root catalog `notecard.api.json`.
    #[arg(value_name = "SCHEMA")]
    pub schema: String,

    /// Instance file (`.json`, `.yaml` or `.yml`).
    #[arg(value_name = "PATH", conflicts_with = "json")]
    pub path: Option<PathBuf>,

    /// Inline JSON instance.
    #[arg(long)]
    pub json: Option<String>,

    /// Report every violation instead of stopping at the first.
    #[arg(long)]
    pub all_errors: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if the instance conforms, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: &CatalogConfig) -> Result<u8> {
    let (label, instance) = match (&args.path, &args.json) {
        (Some(path), _) => {
            let path = crate::resolve_path(path, &config.schema_dir);
            let value = load_instance(&path)?;
            (path.display().to_string(), value)
        }
        (None, Some(text)) => {
            let value: Value = serde_json::from_str(text).context("--json is not valid JSON")?;
            ("<inline>".to_string(), value)
        }
        (None, None) => {
            println!("Usage: ncs validate SCHEMA [--all-errors] (PATH | --json TEXT)");
            return Ok(1);
        }
    };

    let schema_name = args.schema.as_str();
    let store = config.store();
    let resolved = resolve_schema(&store, schema_name)
        .with_context(|| format!("failed to resolve schema {schema_name}"))?;
    for skipped in resolved.registry.skipped() {
        println!("  WARN: skipped {skipped}");
    }
    let compiled = compile(&resolved.document, &resolved.registry)?;

    let mode = if args.all_errors {
        ValidationMode::Exhaustive
    } else {
        ValidationMode::FirstError
    };

    match compiled.validate(&instance, mode) {
        Ok(()) => {
            println!("PASS: {label} against {schema_name}");
            Ok(0)
        }
        Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
            println!("FAIL: {label} against {schema_name}");
            for violation in &violations {
                println!("  {violation}");
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn repo_config() -> CatalogConfig {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schemas");
        CatalogConfig::with_schema_dir(root)
    }

    fn args(schema: &str, json: Option<&str>) -> ValidateArgs {
        ValidateArgs {
            schema: schema.to_string(),
            path: None,
            json: json.map(str::to_string),
            all_errors: true,
        }
    }

    #[test]
    fn inline_request_passes_catalog() {
        let a = args("notecard.api.json", Some(r#"{"req":"card.time"}"#));
        assert_eq!(run_validate(&a, &repo_config()).unwrap(), 0);
    }

    #[test]
    fn inline_request_fails_specific_schema() {
        let code = run_validate(
            &args(
                "card.binary.get.req.notecard.api.json",
                Some(r#"{"req":"card.binary.get","offset":-1}"#),
            ),
            &repo_config(),
        )
        .unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn yaml_instance_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.yaml");
        std::fs::write(&path, "req: card.led\nmode: cyan\n").unwrap();
        let a = ValidateArgs {
            schema: "card.led.req.notecard.api.json".to_string(),
            path: Some(path),
            json: None,
            all_errors: false,
        };
        assert_eq!(run_validate(&a, &repo_config()).unwrap(), 0);
    }

    #[test]
    fn missing_instance_prints_usage() {
        let a = args("notecard.api.json", None);
        assert_eq!(run_validate(&a, &repo_config()).unwrap(), 1);
    }

    #[test]
    fn unknown_schema_is_an_error() {
        let result = run_validate(
            &args("nope.req.notecard.api.json", Some("{}")),
            &repo_config(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn malformed_inline_json_is_an_error() {
        assert!(run_validate(&args("notecard.api.json", Some("{")), &repo_config()).is_err());
    }
}
