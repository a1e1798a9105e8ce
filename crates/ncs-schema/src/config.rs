//! Catalog location and naming configuration.
//!
//! Defaults match the published catalog. Override via environment variables
//! or by setting fields directly (the CLI does this for its flags).

use std::path::PathBuf;

use ncs_core::{CATALOG_FILE_NAME, SCHEMA_URI_BASE};
use url::Url;

use crate::store::SchemaStore;

/// Environment variable naming the schema directory.
pub const SCHEMA_DIR_VAR: &str = "NCS_SCHEMA_DIR";
/// Environment variable naming the root catalog file.
pub const CATALOG_FILE_VAR: &str = "NCS_CATALOG_FILE";
/// Environment variable overriding the canonical `$id` base.
pub const URI_BASE_VAR: &str = "NCS_URI_BASE";

/// Where the catalog lives and how its URIs are formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Directory holding every schema file.
    pub schema_dir: PathBuf,
    /// File name of the root catalog inside `schema_dir`.
    pub catalog_file: String,
    /// Prefix for `$id` and catalog `$ref` URIs. Always ends in `/`.
    pub uri_base: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
            catalog_file: CATALOG_FILE_NAME.to_string(),
            uri_base: SCHEMA_URI_BASE.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Defaults with the given schema directory.
    pub fn with_schema_dir(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `NCS_SCHEMA_DIR` (default: `schemas`)
    /// - `NCS_CATALOG_FILE` (default: `notecard.api.json`)
    /// - `NCS_URI_BASE` (default: the published raw GitHub base)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(dir) = schema_dir_from(&lookup) {
            config.schema_dir = dir;
        }
        if let Some(file) = lookup(CATALOG_FILE_VAR).filter(|s| !s.is_empty()) {
            if !ncs_core::is_filename_safe(&file) {
                return Err(ConfigError::InvalidCatalogFile(file));
            }
            config.catalog_file = file;
        }
        if let Some(base) = lookup(URI_BASE_VAR).filter(|s| !s.is_empty()) {
            config.uri_base = validate_uri_base(URI_BASE_VAR, &base)?;
        }
        Ok(config)
    }

    /// A store over `schema_dir`.
    pub fn store(&self) -> SchemaStore {
        SchemaStore::with_cache(&self.schema_dir)
    }
}

/// `NCS_SCHEMA_DIR`, if set to a non-empty value.
pub fn schema_dir_from_env() -> Option<PathBuf> {
    schema_dir_from(|var| std::env::var(var).ok())
}

fn schema_dir_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    lookup(SCHEMA_DIR_VAR)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn validate_uri_base(var: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("scheme must be http or https, got {}", url.scheme()),
        ));
    }
    if !raw.ends_with('/') {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            "must end with '/'".to_string(),
        ));
    }
    Ok(raw.to_string())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid catalog file name: {0:?}")]
    InvalidCatalogFile(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| vars.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, CatalogConfig::default());
        assert_eq!(cfg.catalog_file, "notecard.api.json");
        assert!(cfg.uri_base.ends_with('/'));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = CatalogConfig::from_lookup(lookup(&[
            (SCHEMA_DIR_VAR, "/tmp/catalog"),
            (CATALOG_FILE_VAR, "root.json"),
            (URI_BASE_VAR, "http://localhost:8000/s/"),
        ]))
        .unwrap();
        assert_eq!(cfg.schema_dir, PathBuf::from("/tmp/catalog"));
        assert_eq!(cfg.catalog_file, "root.json");
        assert_eq!(cfg.uri_base, "http://localhost:8000/s/");
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = CatalogConfig::from_lookup(lookup(&[(SCHEMA_DIR_VAR, "")])).unwrap();
        assert_eq!(cfg.schema_dir, PathBuf::from("schemas"));
        assert_eq!(schema_dir_from(lookup(&[(SCHEMA_DIR_VAR, "")])), None);
        assert_eq!(
            schema_dir_from(lookup(&[(SCHEMA_DIR_VAR, "/srv/s")])),
            Some(PathBuf::from("/srv/s"))
        );
    }

    #[test]
    fn uri_base_must_be_http_and_end_in_slash() {
        for bad in ["not a url", "ftp://example.com/", "https://example.com/s"] {
            let result = CatalogConfig::from_lookup(lookup(&[(URI_BASE_VAR, bad)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidUrl(..))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn catalog_file_must_be_plain_name() {
        let result = CatalogConfig::from_lookup(lookup(&[(CATALOG_FILE_VAR, "../x.json")]));
        assert!(matches!(result, Err(ConfigError::InvalidCatalogFile(_))));
    }
}
