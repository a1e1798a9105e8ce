//! # Schema Documents
//!
//! An immutable parsed schema plus the few top-level fields the registry
//! and tooling care about. Everything else in the body is opaque payload
//! handed to the validator untouched.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A parsed schema file.
///
/// `references` holds the `$ref` strings found directly in the top-level
/// `oneOf` array, in document order. Nested references are not collected:
/// the catalog only dispatches one level deep.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    name: String,
    identity: Option<String>,
    body: Value,
    references: Vec<String>,
}

/// One entry of a schema's `samples` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sample {
    /// What the sample demonstrates.
    #[serde(default)]
    pub description: Option<String>,
    /// The sample message, as a JSON-encoded string.
    #[serde(default)]
    pub json: Option<String>,
}

impl Sample {
    /// Description, or a placeholder for unnamed samples.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or("Unnamed sample")
    }
}

impl SchemaDocument {
    /// Wrap a parsed body, extracting `$id` and top-level `oneOf` references.
    pub fn from_value(name: impl Into<String>, body: Value) -> Self {
        let identity = body
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let references = body
            .get("oneOf")
            .and_then(Value::as_array)
            .map(|branches| {
                branches
                    .iter()
                    .filter_map(|b| b.get("$ref").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: name.into(),
            identity,
            body,
            references,
        }
    }

    /// The file name this document was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared `$id`, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// The full parsed JSON.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume the document, returning the parsed JSON.
    pub fn into_body(self) -> Value {
        self.body
    }

    /// `$ref` URIs listed in the top-level `oneOf`, in order.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// True if the top-level `oneOf` dispatches to other documents.
    pub fn is_catalog(&self) -> bool {
        !self.references.is_empty()
    }

    /// The top-level `oneOf` array.
    pub fn one_of(&self) -> Option<&Vec<Value>> {
        self.body.get("oneOf").and_then(Value::as_array)
    }

    /// The top-level `properties` object.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.body.get("properties").and_then(Value::as_object)
    }

    /// The `title` string.
    pub fn title(&self) -> Option<&str> {
        self.body.get("title").and_then(Value::as_str)
    }

    /// The `description` string.
    pub fn description(&self) -> Option<&str> {
        self.body.get("description").and_then(Value::as_str)
    }

    /// A top-level string field such as `version` or `apiVersion`.
    pub fn string_field(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// The `samples` array. Absent means no samples.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if `samples` is present but is not
    /// an array of objects.
    pub fn samples(&self) -> Result<Vec<Sample>, serde_json::Error> {
        match self.body.get("samples") {
            Some(samples) => Vec::<Sample>::deserialize(samples),
            None => Ok(Vec::new()),
        }
    }

    /// The command name this request schema accepts, from the `req` or
    /// `cmd` property's `const`.
    pub fn command_name(&self) -> Option<&str> {
        let props = self.properties()?;
        ["req", "cmd"]
            .iter()
            .find_map(|key| props.get(*key)?.get("const")?.as_str())
    }
}
