//! Markdown API reference rendered from the catalog and its registry.
//!
//! Only local data is used. A catalog reference the registry does not hold
//! is listed under "Unavailable schemas" instead of being fetched.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::document::SchemaDocument;
use crate::registry::Registry;

const HEADER_NOTE: &str = "The Notecard accepts requests in JSON format. Each request object must contain a `req` or `cmd` field specifying the request type. E.g. `{\"req\": \"card.status\"}` or `{\"cmd\": \"card.status\"}`\n";

/// Render the reference for every request `catalog` dispatches to, sorted
/// by reference URI.
pub fn render_markdown(catalog: &SchemaDocument, registry: &Registry) -> String {
    let refs: BTreeSet<&str> = catalog.references().iter().map(String::as_str).collect();
    let version = catalog.string_field("version").unwrap_or("Unknown");
    let api_version = catalog.string_field("apiVersion").unwrap_or("Unknown");

    let mut out = vec![
        "# Notecard API Reference".to_string(),
        format!(
            "_Generated from [notecard-schema](https://github.com/blues/notecard-schema) version {version} (API Version: {api_version})_\n"
        ),
        "## Requests\n".to_string(),
        HEADER_NOTE.to_string(),
    ];

    let mut unavailable = Vec::new();
    for uri in refs {
        match registry.get(uri) {
            Some(doc) => out.push(render_request(doc)),
            None => unavailable.push(uri),
        }
    }

    if !unavailable.is_empty() {
        tracing::warn!(
            count = unavailable.len(),
            "some catalog references are not available locally"
        );
        out.push("## Unavailable schemas\n".to_string());
        for uri in unavailable {
            out.push(format!("- <{uri}>"));
        }
        out.push(String::new());
    }

    let mut text = out.join("\n");
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

fn properties_of(doc: &SchemaDocument) -> Option<&Map<String, Value>> {
    doc.properties().or_else(|| {
        doc.body()
            .get("allOf")?
            .as_array()?
            .iter()
            .find_map(|item| item.get("properties")?.as_object())
    })
}

/// One `### \`name\`` section.
pub fn render_request(doc: &SchemaDocument) -> String {
    let title = doc.title().unwrap_or("Untitled Request");
    let description = doc.description().unwrap_or("No description available.");
    let properties = properties_of(doc);

    let name = properties
        .and_then(|p| {
            ["req", "cmd"]
                .iter()
                .find_map(|k| p.get(*k)?.get("const")?.as_str())
        })
        .filter(|n| !n.is_empty())
        .or_else(|| title.split(' ').next().filter(|n| !n.is_empty()))
        .unwrap_or("request");

    let mut parts = vec![format!("### `{name}`\n"), format!("{description}\n")];

    match properties {
        Some(props) => {
            let params: Vec<(&String, &Value)> = props
                .iter()
                .filter(|(k, _)| k.as_str() != "req" && k.as_str() != "cmd")
                .collect();
            if !params.is_empty() {
                parts.push("**Parameters:**\n".to_string());
                parts.push("| Parameter | Type | Description | Default |".to_string());
                parts.push("|---|---|---|---|".to_string());
                for (param, details) in params {
                    parts.push(parameter_row(param, details));
                }
                parts.push("\n".to_string());
            }
        }
        None => parts.push("No specific parameters defined.\n".to_string()),
    }

    parts.join("\n")
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_label(details: &Value) -> String {
    match details.get("type") {
        Some(Value::Array(types)) => types.iter().map(plain).collect::<Vec<_>>().join(", "),
        Some(t) => plain(t),
        None => "-".to_string(),
    }
}

/// Alternatives of a `^(?:a|b|c)...` pattern, deduplicated and sorted.
fn pattern_alternatives(pattern: &str) -> Vec<String> {
    let Some(rest) = pattern.strip_prefix("^(?:") else {
        return Vec::new();
    };
    let inner = rest.split(')').next().unwrap_or("");
    if !inner.contains('|') {
        return Vec::new();
    }
    let set: BTreeSet<String> = inner
        .split('|')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    set.into_iter().collect()
}

fn parameter_row(name: &str, details: &Value) -> String {
    if !details.is_object() {
        return format!("| `{name}` | `unknown` | Invalid property definition | `-` |");
    }

    let mut description = details
        .get("description")
        .map(plain)
        .unwrap_or_else(|| "-".to_string());

    if let Some(options) = details.get("enum").and_then(Value::as_array) {
        let values: Vec<String> = options.iter().map(|v| format!("`{}`", plain(v))).collect();
        description.push_str(&format!(". Allowed values: {}", values.join(", ")));
    } else if let Some(pattern) = details.get("pattern").and_then(Value::as_str) {
        let values = pattern_alternatives(pattern);
        if !values.is_empty() {
            let lower = description.to_lowercase();
            if !lower.contains("one of the following") && !lower.contains("must be") {
                description.push('.');
            }
            let values: Vec<String> = values.iter().map(|v| format!("`{v}`")).collect();
            description.push_str(&format!(
                " Allowed values (comma separated): {}",
                values.join(", ")
            ));
        }
    }

    let default = match details.get("default") {
        Some(v @ (Value::Object(_) | Value::Array(_))) => v.to_string(),
        Some(v) => format!("`{}`", plain(v)),
        None => "`-`".to_string(),
    };

    format!("| `{name}` | `{}` | {description} | {default} |", type_label(details))
}
