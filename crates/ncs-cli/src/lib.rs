//! # ncs-cli: Command-Line Tooling for the Notecard Schema Catalog
//!
//! Provides the `ncs` binary. Each subcommand lives in its own module and
//! exposes `run_<name>(&args, &config) -> anyhow::Result<u8>`, where the
//! `u8` is the process exit code.
//!
//! ## Subcommands
//!
//! - `ncs validate`: validate a JSON/YAML instance against a schema.
//! - `ncs check`: catalog consistency plus schema and sample audit.
//! - `ncs new`: scaffold request/response schemas for a new API.
//! - `ncs version`: set `version` or `apiVersion` across the catalog.
//! - `ncs docs`: render the Markdown API reference.
//!
//! ```bash
//! ncs validate card.random.req.notecard.api.json --json '{"req":"card.random"}'
//! ncs check
//! ncs new card.example
//! ncs version --property apiVersion --target-version 9.2.0
//! ncs docs --output NOTECARD_API.md
//! ```

pub mod check;
pub mod docs;
pub mod new;
pub mod validate;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ncs_schema::config::schema_dir_from_env;
use ncs_schema::CatalogConfig;

/// Resolve a path that may be relative to `base`.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `base` is joined onto it; otherwise it is taken relative to the current
/// directory.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let based = base.join(path);
    if based.exists() {
        based
    } else {
        path.to_path_buf()
    }
}

/// Walk up from `start` to the first directory whose `schemas/` holds
/// `catalog_file`.
pub fn find_repo_root(start: &Path, catalog_file: &str) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("schemas").join(catalog_file).is_file() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Build the effective configuration.
///
/// Precedence for the schema directory: `--schema-dir`, then
/// `NCS_SCHEMA_DIR`, then `schemas/` under the discovered repository root,
/// then `schemas/` under the current directory.
pub fn load_config(schema_dir_flag: Option<&Path>) -> Result<CatalogConfig> {
    let mut config = CatalogConfig::from_env().context("invalid NCS_* environment")?;

    if let Some(dir) = schema_dir_flag {
        config.schema_dir = dir.to_path_buf();
    } else if schema_dir_from_env().is_none() {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        match find_repo_root(&cwd, &config.catalog_file) {
            Some(root) => config.schema_dir = root.join("schemas"),
            None => {
                tracing::warn!("could not locate repository root; using ./schemas");
                config.schema_dir = cwd.join("schemas");
            }
        }
    }

    tracing::debug!(
        schema_dir = %config.schema_dir.display(),
        catalog = %config.catalog_file,
        "resolved catalog configuration"
    );
    Ok(config)
}
