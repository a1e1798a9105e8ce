//! # ncs-core: Foundational Types for the Notecard Schema Catalog
//!
//! Defines the naming rules every other crate in the workspace relies on.
//! The on-disk catalog is a flat directory of JSON Schema files whose names
//! encode the API command and the message direction:
//!
//! ```text
//! notecard.api.json                      root catalog
//! card.random.req.notecard.api.json      request schema for `card.random`
//! card.random.rsp.notecard.api.json      response schema for `card.random`
//! ```
//!
//! These names must be preserved bit-exact; they double as the final path
//! segment of every schema `$id` and `$ref` URI.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ncs-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod naming;
pub mod version;

pub use digest::{sha256_digest, ContentDigest};
pub use error::{NameError, VersionError};
pub use naming::{
    is_filename_safe, ApiName, MessageKind, SchemaFileName, CATALOG_FILE_NAME,
    JSON_SCHEMA_DRAFT_URI, SCHEMA_FILE_SUFFIX, SCHEMA_URI_BASE,
};
pub use version::{SchemaVersion, VersionField};
