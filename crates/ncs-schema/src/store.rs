//! # Schema Store
//!
//! All file-system access to the catalog goes through [`SchemaStore`].
//! Callers address schemas by plain file name; the store owns the mapping
//! to `<root>/<name>` and refuses names that would escape the root.
//!
//! ## Caching
//!
//! A store built with [`SchemaStore::with_cache`] keeps parsed documents
//! keyed by path. Every load still reads the file's bytes and compares
//! their SHA-256 digest with the cached one, so an edited file is always
//! re-parsed. Only the JSON parse is saved.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use ncs_core::{
    is_filename_safe, sha256_digest, ContentDigest, NameError, SchemaFileName, SCHEMA_FILE_SUFFIX,
};
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

use crate::document::SchemaDocument;

/// Errors from loading or writing schema files.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No file with this name exists in the store.
    #[error("schema '{name}' not found at {}", .path.display())]
    NotFound {
        /// The requested file name.
        name: String,
        /// The path that was probed.
        path: PathBuf,
    },

    /// The file exists but is not valid JSON.
    #[error("schema '{name}' is not valid JSON: {source}")]
    Parse {
        /// The file name.
        name: String,
        /// The underlying parser error (carries line and column).
        source: serde_json::Error,
    },

    /// The name is not a plain file name.
    #[error("invalid schema name: {0}")]
    InvalidName(#[from] NameError),

    /// Any other I/O failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// True for the "file absent" case that satellite resolution tolerates.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Read-mostly access to a flat directory of schema files.
#[derive(Debug)]
pub struct SchemaStore {
    root: PathBuf,
    cache: Option<Mutex<HashMap<PathBuf, (ContentDigest, SchemaDocument)>>>,
}

impl SchemaStore {
    /// A store over `root` without caching.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: None,
        }
    }

    /// A store over `root` that reuses parsed documents whose file content
    /// has not changed.
    pub fn with_cache(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Some(Mutex::new(HashMap::new())),
        }
    }

    /// The directory this store reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a file name to its path inside the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidName`] for empty names, names with path
    /// separators, and `.`/`..`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_filename_safe(name) {
            return Err(NameError::UnsafeFileName(name.to_string()).into());
        }
        Ok(self.root.join(name))
    }

    /// True if a file with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Load and parse the named schema.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the file does not exist,
    /// [`StoreError::Parse`] if it is not valid JSON.
    pub fn load(&self, name: &str) -> Result<SchemaDocument, StoreError> {
        let path = self.path_for(name)?;
        let bytes = std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    name: name.to_string(),
                    path: path.clone(),
                }
            } else {
                StoreError::Io {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        let Some(cache) = &self.cache else {
            return parse_document(name, &bytes);
        };

        let digest = sha256_digest(&bytes);
        if let Some((cached_digest, doc)) = cache.lock().get(&path) {
            if *cached_digest == digest {
                tracing::trace!(schema = name, "schema cache hit");
                return Ok(doc.clone());
            }
        }
        let doc = parse_document(name, &bytes)?;
        cache.lock().insert(path, (digest, doc.clone()));
        Ok(doc)
    }

    /// File names of every `*.notecard.api.json` schema in the store, sorted.
    ///
    /// The root catalog (`notecard.api.json`) is not included: its name does
    /// not carry the `.notecard.api.json` suffix after an API name.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = self.list_json_files()?;
        names.retain(|n| n.ends_with(SCHEMA_FILE_SUFFIX));
        Ok(names)
    }

    /// Every schema file whose name parses as a [`SchemaFileName`], sorted.
    pub fn list_schema_files(&self) -> Result<Vec<SchemaFileName>, StoreError> {
        let mut files: Vec<SchemaFileName> = self
            .list()?
            .iter()
            .filter_map(|n| SchemaFileName::parse(n).ok())
            .collect();
        files.sort();
        Ok(files)
    }

    /// File names of every `*.json` file directly under the root, sorted.
    pub fn list_json_files(&self) -> Result<Vec<String>, StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.root.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(".json") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write `value` to the named file as 4-space indented JSON with a
    /// trailing newline, the layout every catalog file uses.
    pub fn write(&self, name: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        let bytes = to_pretty_json(value);
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut file = std::fs::File::create(&path).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        tracing::debug!(schema = name, "wrote schema file");
        Ok(())
    }
}

fn parse_document(name: &str, bytes: &[u8]) -> Result<SchemaDocument, StoreError> {
    let body: Value = serde_json::from_slice(bytes).map_err(|source| StoreError::Parse {
        name: name.to_string(),
        source,
    })?;
    Ok(SchemaDocument::from_value(name, body))
}

/// Serialize with 4-space indentation and a trailing newline.
pub fn to_pretty_json(value: &Value) -> Vec<u8> {
    use serde::Serialize;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    // Serializing a `Value` into a `Vec` cannot fail.
    let _ = value.serialize(&mut ser);
    out.push(b'\n');
    out
}
