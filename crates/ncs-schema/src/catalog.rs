//! # Catalog Checks
//!
//! Two passes over a schema directory:
//!
//! - [`check_consistency`] compares the catalog's `oneOf` references with
//!   the request files on disk. The registry builder tolerates a dangling
//!   reference; this check does not.
//! - [`audit_catalog`] compiles the catalog and every schema file, then
//!   validates each schema's `samples` against the schema itself.

use std::collections::BTreeSet;
use std::fmt;

use ncs_core::MessageKind;
use serde_json::Value;

use crate::document::SchemaDocument;
use crate::registry::{
    build_registry, reference_file_name, resolve_schema, LocalResolver, RegistryError,
};
use crate::store::{SchemaStore, StoreError};
use crate::validate::{compile, ValidationMode};

/// Differences between catalog references and request files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Distinct request file names the catalog references.
    pub referenced: usize,
    /// Request files present in the store.
    pub request_files: usize,
    /// Request files no catalog entry references.
    pub orphans: Vec<String>,
    /// Referenced file names with no request file behind them.
    pub dangling: Vec<String>,
    /// File names referenced more than once.
    pub duplicates: Vec<String>,
    /// Indices of `oneOf` entries that are not `{"$ref": ...}` or whose URI
    /// has no file name.
    pub malformed_entries: Vec<usize>,
}

impl ConsistencyReport {
    /// True when references and files match one-to-one.
    pub fn is_consistent(&self) -> bool {
        self.orphans.is_empty()
            && self.dangling.is_empty()
            && self.duplicates.is_empty()
            && self.malformed_entries.is_empty()
    }
}

/// Compare `catalog`'s references with the request files in `store`.
///
/// # Errors
///
/// Only I/O failures listing the store.
pub fn check_consistency(
    catalog: &SchemaDocument,
    store: &SchemaStore,
) -> Result<ConsistencyReport, StoreError> {
    let mut report = ConsistencyReport::default();
    let mut referenced = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for (index, entry) in catalog.one_of().into_iter().flatten().enumerate() {
        let name = entry
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(reference_file_name);
        match name {
            Some(name) => {
                if !referenced.insert(name.clone()) {
                    duplicates.insert(name);
                }
            }
            None => report.malformed_entries.push(index),
        }
    }

    let request_files: BTreeSet<String> = store
        .list_schema_files()?
        .into_iter()
        .filter(|f| f.kind() == MessageKind::Request)
        .map(|f| f.file_name())
        .collect();

    report.referenced = referenced.len();
    report.request_files = request_files.len();
    report.orphans = request_files.difference(&referenced).cloned().collect();
    report.dangling = referenced.difference(&request_files).cloned().collect();
    report.duplicates = duplicates.into_iter().collect();
    Ok(report)
}

/// A problem found by [`audit_catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// The schema file the problem belongs to.
    pub schema: String,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.schema, self.message)
    }
}

/// Result of [`audit_catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Schema files compiled, the catalog included.
    pub schemas_checked: usize,
    /// Samples validated.
    pub samples_checked: usize,
    /// Everything that failed.
    pub findings: Vec<Finding>,
}

impl AuditReport {
    /// True if nothing failed.
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    fn finding(&mut self, schema: &str, message: impl Into<String>) {
        self.findings.push(Finding {
            schema: schema.to_string(),
            message: message.into(),
        });
    }
}

/// Compile the catalog and every schema, and validate every sample.
///
/// # Errors
///
/// Fails only if the catalog itself cannot be loaded or the store cannot be
/// listed. Everything else is reported as a [`Finding`].
pub fn audit_catalog(store: &SchemaStore, catalog_name: &str) -> Result<AuditReport, StoreError> {
    let mut report = AuditReport::default();

    match resolve_schema(store, catalog_name) {
        Ok(resolved) => {
            report.schemas_checked += 1;
            if let Err(e) = compile(&resolved.document, &resolved.registry) {
                report.finding(catalog_name, e.to_string());
            }
        }
        Err(RegistryError::Root(e)) => return Err(e),
        Err(e @ RegistryError::Satellite { .. }) => report.finding(catalog_name, e.to_string()),
    }

    for name in store.list()? {
        let doc = match store.load(&name) {
            Ok(doc) => doc,
            Err(e) => {
                report.finding(&name, e.to_string());
                continue;
            }
        };
        report.schemas_checked += 1;
        audit_schema(&doc, store, &mut report);
    }

    tracing::info!(
        schemas = report.schemas_checked,
        samples = report.samples_checked,
        findings = report.findings.len(),
        "catalog audit complete"
    );
    Ok(report)
}

fn audit_schema(doc: &SchemaDocument, store: &SchemaStore, report: &mut AuditReport) {
    let name = doc.name();
    let compiled = match build_registry(doc, &LocalResolver::new(store)) {
        Ok(registry) => compile(doc, &registry),
        Err(e) => {
            report.finding(name, e.to_string());
            return;
        }
    };
    let compiled = match compiled {
        Ok(c) => c,
        Err(e) => {
            report.finding(name, e.to_string());
            return;
        }
    };

    let samples = match doc.samples() {
        Ok(s) => s,
        Err(e) => {
            report.finding(name, format!("malformed samples: {e}"));
            return;
        }
    };
    for sample in samples {
        report.samples_checked += 1;
        let Some(text) = sample.json.as_deref() else {
            report.finding(name, format!("sample '{}' has no json", sample.label()));
            continue;
        };
        let instance: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                report.finding(
                    name,
                    format!("sample '{}' is not valid JSON: {e}", sample.label()),
                );
                continue;
            }
        };
        if let Err(e) = compiled.validate(&instance, ValidationMode::Exhaustive) {
            let details: Vec<String> = e.violations().iter().map(ToString::to_string).collect();
            report.finding(
                name,
                format!("sample '{}' failed: {}", sample.label(), details.join("; ")),
            );
        }
    }
}
