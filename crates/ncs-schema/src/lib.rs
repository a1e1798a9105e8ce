//! # ncs-schema: Catalog Loading, Resolution & Validation
//!
//! Everything that reads or writes the schema directory.
//!
//! ## Responsibilities
//!
//! - **Store:** load schema files by name, optionally caching parsed
//!   documents by content digest.
//! - **Registry:** resolve a root schema's catalog `$ref`s to local files
//!   so validation never touches the network.
//! - **Validation:** compile a root plus its registry with `jsonschema`
//!   (draft 2020-12) and report classified violations.
//! - **Tooling:** catalog consistency and sample audits, scaffolding of new
//!   API schemas, bulk version updates, Markdown reference rendering.
//!
//! ## Session model
//!
//! ```text
//! SchemaStore ──load──▶ SchemaDocument ──build_registry──▶ Registry
//!                                 │                           │
//!                                 └──────────compile──────────┘
//!                                              │
//!                                        CompiledSchema ──validate──▶ Violations
//! ```
//!
//! A [`Registry`] belongs to one session. Nothing in this crate holds
//! process-wide state.

pub mod catalog;
pub mod config;
pub mod document;
pub mod docs;
pub mod registry;
pub mod scaffold;
pub mod store;
pub mod validate;
pub mod versioning;

pub use catalog::{audit_catalog, check_consistency, AuditReport, ConsistencyReport, Finding};
pub use config::{CatalogConfig, ConfigError};
pub use document::{Sample, SchemaDocument};
pub use docs::render_markdown;
pub use registry::{
    build_registry, normalize_uri, reference_file_name, resolve_schema, Insertion, LocalResolver,
    Registry, RegistryError, Resolve, ResolvedSchema, SkipReason, SkippedReference,
};
pub use scaffold::{scaffold_api, ScaffoldError, ScaffoldReport};
pub use store::{SchemaStore, StoreError};
pub use validate::{
    compile, load_instance, CompiledSchema, SchemaValidationError, ValidationMode, Violation,
    ViolationKind,
};
pub use versioning::{set_version, VersionChange, VersionReport};
