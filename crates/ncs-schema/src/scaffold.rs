//! Scaffolding for a new API: request and response schema templates plus
//! the catalog entry that dispatches to the request.

use ncs_core::{ApiName, MessageKind, NameError, SchemaFileName, JSON_SCHEMA_DRAFT_URI};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::CatalogConfig;
use crate::store::StoreError;

/// Default `version` written into new schemas.
pub const TEMPLATE_VERSION: &str = "0.1.1";
/// Default `apiVersion` written into new schemas.
pub const TEMPLATE_API_VERSION: &str = "9.1.1";

/// Errors from [`scaffold_api`].
#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error("schema files for '{api}' already exist: {}", .existing.join(", "))]
    AlreadyExists { api: String, existing: Vec<String> },

    #[error("catalog {0} has no oneOf array")]
    CatalogShape(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What [`scaffold_api`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub request_file: String,
    pub response_file: String,
    /// Position of the new `$ref` in the catalog's `oneOf`.
    pub catalog_index: usize,
}

/// Request schema template: `req`/`cmd` exclusivity, no extra properties,
/// one sample.
pub fn request_template(api: &ApiName, uri_base: &str) -> Value {
    let file = SchemaFileName::new(api.clone(), MessageKind::Request);
    json!({
        "$schema": JSON_SCHEMA_DRAFT_URI,
        "$id": file.uri(uri_base),
        "title": format!("{api} Request Application Programming Interface (API) Schema"),
        "description": format!("Request schema for {api} API command."),
        "type": "object",
        "skus": ["CELL", "CELL+WIFI", "WIFI", "LORA"],
        "version": TEMPLATE_VERSION,
        "apiVersion": TEMPLATE_API_VERSION,
        "properties": {
            "cmd": {
                "description": "Command for the Notecard (no response)",
                "const": api.as_str()
            },
            "req": {
                "description": "Request for the Notecard (expects response)",
                "const": api.as_str()
            }
        },
        "oneOf": [
            {
                "required": ["req"],
                "properties": {"req": {"const": api.as_str()}}
            },
            {
                "required": ["cmd"],
                "properties": {"cmd": {"const": api.as_str()}}
            }
        ],
        "additionalProperties": false,
        "samples": [
            {
                "description": format!("Basic {api} request."),
                "json": json!({"req": api.as_str()}).to_string()
            }
        ],
        "annotations": [
            {
                "title": "note",
                "description": "Placeholder annotation."
            }
        ]
    })
}

/// Response schema template: a single `status` string, one sample.
pub fn response_template(api: &ApiName, uri_base: &str) -> Value {
    let file = SchemaFileName::new(api.clone(), MessageKind::Response);
    json!({
        "$schema": JSON_SCHEMA_DRAFT_URI,
        "$id": file.uri(uri_base),
        "title": format!("{api} Response Application Programming Interface (API) Schema"),
        "type": "object",
        "version": TEMPLATE_VERSION,
        "apiVersion": TEMPLATE_API_VERSION,
        "properties": {
            "status": {
                "description": "Status of the operation",
                "type": "string"
            }
        },
        "samples": [
            {
                "description": format!("Basic {api} response."),
                "json": r#"{"status": "success"}"#
            }
        ]
    })
}

/// Insert `{"$ref": uri}` into `catalog`'s `oneOf` before the first entry
/// whose `$ref` sorts after `uri`. Returns the insertion index.
///
/// Entries without a `$ref` compare as the empty string, so they never
/// push the new entry past them.
pub fn insert_catalog_ref(catalog: &mut Value, uri: &str) -> Option<usize> {
    let one_of = catalog.get_mut("oneOf")?.as_array_mut()?;
    let index = one_of
        .iter()
        .position(|entry| entry.get("$ref").and_then(Value::as_str).unwrap_or("") > uri)
        .unwrap_or(one_of.len());
    one_of.insert(index, json!({"$ref": uri}));
    Some(index)
}

/// Create both schema files for `api_name` and register the request in the
/// catalog.
///
/// Nothing is written if either file already exists.
pub fn scaffold_api(
    config: &CatalogConfig,
    api_name: &str,
) -> Result<ScaffoldReport, ScaffoldError> {
    let api = ApiName::new(api_name)?;
    let store = config.store();
    let request = SchemaFileName::new(api.clone(), MessageKind::Request);
    let response = SchemaFileName::new(api.clone(), MessageKind::Response);

    let existing: Vec<String> = [&request, &response]
        .iter()
        .map(|f| f.file_name())
        .filter(|n| store.contains(n))
        .collect();
    if !existing.is_empty() {
        return Err(ScaffoldError::AlreadyExists {
            api: api.to_string(),
            existing,
        });
    }

    let mut catalog = store.load(&config.catalog_file)?.into_body();
    let catalog_index = insert_catalog_ref(&mut catalog, &request.uri(&config.uri_base))
        .ok_or_else(|| ScaffoldError::CatalogShape(config.catalog_file.clone()))?;

    store.write(&request.file_name(), &request_template(&api, &config.uri_base))?;
    store.write(&response.file_name(), &response_template(&api, &config.uri_base))?;
    store.write(&config.catalog_file, &catalog)?;

    tracing::info!(api = %api, index = catalog_index, "scaffolded API schemas");
    Ok(ScaffoldReport {
        request_file: request.file_name(),
        response_file: response.file_name(),
        catalog_index,
    })
}
