//! # Instance Validation
//!
//! Compiles a [`SchemaDocument`] together with its [`Registry`] into a
//! draft 2020-12 validator and checks JSON instances against it.
//!
//! ## Resolution
//!
//! `$ref` URIs are answered only from the registry. A URI the registry does
//! not hold fails compilation with [`SchemaValidationError::Unresolved`];
//! nothing is fetched over the network.
//!
//! Catalog branches whose reference was soft-skipped while building the
//! registry are compiled as the `false` schema. Instances that need such a
//! branch report "no matching branch"; every other branch keeps working.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

use crate::document::SchemaDocument;
use crate::registry::{normalize_uri, with_normalized_id, Registry};

/// How many violations [`CompiledSchema::validate`] collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Stop at the first violation.
    #[default]
    FirstError,
    /// Report every violation.
    Exhaustive,
}

/// Coarse classification of a single violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// No `oneOf` branch matched.
    NoMatchingBranch,
    /// More than one `oneOf` branch matched.
    MultipleMatchingBranches,
    /// Properties forbidden by `additionalProperties: false`.
    UnexpectedProperties(Vec<String>),
    /// A `required` property is absent.
    MissingProperty(String),
    /// Value differs from `const`.
    Const,
    /// Value is not one of the `enum` options.
    Enum,
    /// Wrong JSON type.
    Type,
    /// Numeric bound violated.
    Range,
    /// String does not match `pattern`.
    Pattern,
    /// Anything else.
    Other,
}

impl ViolationKind {
    fn from_error_kind(kind: &ValidationErrorKind) -> Self {
        match kind {
            ValidationErrorKind::OneOfNotValid { .. } => Self::NoMatchingBranch,
            ValidationErrorKind::OneOfMultipleValid { .. } => Self::MultipleMatchingBranches,
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                Self::UnexpectedProperties(unexpected.clone())
            }
            ValidationErrorKind::Required { property } => Self::MissingProperty(
                property
                    .as_str()
                    .map_or_else(|| property.to_string(), str::to_string),
            ),
            ValidationErrorKind::Constant { .. } => Self::Const,
            ValidationErrorKind::Enum { .. } => Self::Enum,
            ValidationErrorKind::Type { .. } => Self::Type,
            ValidationErrorKind::Minimum { .. }
            | ValidationErrorKind::Maximum { .. }
            | ValidationErrorKind::ExclusiveMinimum { .. }
            | ValidationErrorKind::ExclusiveMaximum { .. } => Self::Range,
            ValidationErrorKind::Pattern { .. } => Self::Pattern,
            _ => Self::Other,
        }
    }
}

/// One way an instance failed its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value (`""` for the root).
    pub instance_path: String,
    /// JSON Pointer to the failing keyword in the schema.
    pub schema_path: String,
    /// Classified kind.
    pub kind: ViolationKind,
    /// The validator's message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() {
            "(root)"
        } else {
            &self.instance_path
        };
        write!(f, "{at}: {}", self.message)
    }
}

/// Errors from compiling schemas and validating instances.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The instance does not conform.
    #[error("{} violation(s) against {schema}", .violations.len())]
    ValidationFailed {
        /// The schema that was violated.
        schema: String,
        /// What went wrong, in validator order.
        violations: Vec<Violation>,
    },

    /// A `$ref` could not be answered from the registry.
    #[error("schema {schema} references {uri}, which is not in the registry")]
    Unresolved {
        /// The schema being compiled.
        schema: String,
        /// The URI that had no registry entry.
        uri: String,
    },

    /// The schema is not a valid draft 2020-12 schema.
    #[error("failed to compile schema {schema}: {reason}")]
    SchemaCompile {
        /// The schema being compiled.
        schema: String,
        /// The compiler's message.
        reason: String,
    },

    /// An instance file could not be read or parsed.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoad {
        /// The instance path.
        path: String,
        /// What went wrong.
        reason: String,
    },
}

impl SchemaValidationError {
    /// The violations carried by a validation failure, if that is what this is.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::ValidationFailed { violations, .. } => violations,
            _ => &[],
        }
    }
}

/// Serves `$ref` lookups from a snapshot of the registry and remembers the
/// URIs it could not answer.
struct RegistryRetriever {
    bodies: HashMap<String, Value>,
    misses: Arc<Mutex<Vec<String>>>,
}

impl jsonschema::Retrieve for RegistryRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        match self.bodies.get(&normalize_uri(uri_str)) {
            Some(body) => Ok(body.clone()),
            None => {
                self.misses.lock().push(uri_str.to_string());
                Err(format!("no registry entry for {uri_str}").into())
            }
        }
    }
}

/// A validator ready to check instances.
pub struct CompiledSchema {
    name: String,
    validator: jsonschema::Validator,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// The file name of the compiled root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if `instance` conforms.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Check `instance`, collecting violations according to `mode`.
    ///
    /// # Errors
    ///
    /// [`SchemaValidationError::ValidationFailed`] with at least one
    /// violation (exactly one in [`ValidationMode::FirstError`]).
    pub fn validate(
        &self,
        instance: &Value,
        mode: ValidationMode,
    ) -> Result<(), SchemaValidationError> {
        let errors = self.validator.iter_errors(instance).map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            kind: ViolationKind::from_error_kind(&e.kind),
            message: e.to_string(),
        });
        let violations: Vec<Violation> = match mode {
            ValidationMode::FirstError => errors.take(1).collect(),
            ValidationMode::Exhaustive => errors.collect(),
        };
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema: self.name.clone(),
                violations,
            })
        }
    }
}

/// Replace top-level `oneOf` branches that point at soft-skipped references
/// with `false`.
fn prune_skipped_branches(body: &Value, registry: &Registry) -> Value {
    let mut body = with_normalized_id(body);
    if registry.skipped().is_empty() {
        return body;
    }
    if let Some(branches) = body.get_mut("oneOf").and_then(Value::as_array_mut) {
        for branch in branches.iter_mut() {
            let skipped = branch
                .get("$ref")
                .and_then(Value::as_str)
                .is_some_and(|uri| registry.is_skipped(uri));
            if skipped {
                *branch = Value::Bool(false);
            }
        }
    }
    body
}

/// Compile `document` against `registry`.
///
/// # Errors
///
/// [`SchemaValidationError::Unresolved`] if a `$ref` has no registry entry,
/// [`SchemaValidationError::SchemaCompile`] for any other compile failure.
pub fn compile(
    document: &SchemaDocument,
    registry: &Registry,
) -> Result<CompiledSchema, SchemaValidationError> {
    let schema = prune_skipped_branches(document.body(), registry);
    let misses = Arc::new(Mutex::new(Vec::new()));
    let retriever = RegistryRetriever {
        bodies: registry.bodies(),
        misses: Arc::clone(&misses),
    };

    let validator = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .with_retriever(retriever)
        .build(&schema)
        .map_err(|e| {
            let first_miss = misses.lock().first().cloned();
            match first_miss {
                Some(uri) => SchemaValidationError::Unresolved {
                    schema: document.name().to_string(),
                    uri,
                },
                None => SchemaValidationError::SchemaCompile {
                    schema: document.name().to_string(),
                    reason: e.to_string(),
                },
            }
        })?;

    tracing::debug!(schema = document.name(), "compiled schema");
    Ok(CompiledSchema {
        name: document.name().to_string(),
        validator,
    })
}

/// Read an instance file, parsing `.yaml`/`.yml` as YAML and anything else
/// as JSON.
pub fn load_instance(path: &Path) -> Result<Value, SchemaValidationError> {
    let load_err = |reason: String| SchemaValidationError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| load_err(format!("YAML parse error: {e}")))
    } else {
        serde_json::from_str(&content).map_err(|e| load_err(format!("JSON parse error: {e}")))
    }
}
