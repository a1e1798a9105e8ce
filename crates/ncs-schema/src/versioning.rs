//! Bulk update of the `version` / `apiVersion` field across a schema
//! directory.

use ncs_core::{SchemaVersion, VersionField};
use serde_json::Value;

use crate::store::{SchemaStore, StoreError};

/// A field that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub file: String,
    /// Previous value as it appeared in the file.
    pub from: String,
}

/// Outcome of [`set_version`], one entry per `*.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionReport {
    pub updated: Vec<VersionChange>,
    /// Already at the target.
    pub unchanged: Vec<String>,
    /// No such top-level field.
    pub missing_field: Vec<String>,
    /// Not valid JSON; left untouched.
    pub invalid: Vec<(String, String)>,
}

/// Set `field` to `target` in every `*.json` file of `store`.
///
/// Files already at `target`, files without the field, and files that do
/// not parse are left as they are. Rewritten files keep their key order.
///
/// # Errors
///
/// I/O failures listing the directory or writing a file.
pub fn set_version(
    store: &SchemaStore,
    field: VersionField,
    target: SchemaVersion,
) -> Result<VersionReport, StoreError> {
    let target = target.to_string();
    let key = field.key();
    let mut report = VersionReport::default();

    for name in store.list_json_files()? {
        let mut body = match store.load(&name) {
            Ok(doc) => doc.into_body(),
            Err(e @ StoreError::Parse { .. }) => {
                tracing::warn!(file = %name, "skipping invalid JSON");
                report.invalid.push((name, e.to_string()));
                continue;
            }
            Err(e) => return Err(e),
        };

        let Some(current) = body.get_mut(key) else {
            report.missing_field.push(name);
            continue;
        };
        if current.as_str() == Some(target.as_str()) {
            report.unchanged.push(name);
            continue;
        }
        let from = match &*current {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        *current = Value::String(target.clone());
        store.write(&name, &body)?;
        tracing::info!(
            file = %name,
            field = key,
            from = %from,
            to = %target,
            "updated version field"
        );
        report.updated.push(VersionChange { file: name, from });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_only_files_that_need_it() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("a.json", r#"{"title": "a", "version": "0.1.0", "apiVersion": "9.1.1"}"#),
            ("b.json", r#"{"version": "0.2.0"}"#),
            ("c.json", r#"{"title": "no version"}"#),
            ("d.json", "{ broken"),
            ("notes.txt", r#"{"version": "0.1.0"}"#),
        ];
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let store = SchemaStore::new(dir.path());
        let target = SchemaVersion::parse("0.2.0").unwrap();

        let report = set_version(&store, VersionField::Version, target).unwrap();
        assert_eq!(
            report.updated,
            [VersionChange {
                file: "a.json".to_string(),
                from: "0.1.0".to_string()
            }]
        );
        assert_eq!(report.unchanged, ["b.json"]);
        assert_eq!(report.missing_field, ["c.json"]);
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].0, "d.json");

        let a = std::fs::read_to_string(dir.path().join("a.json")).unwrap();
        assert_eq!(
            a,
            "{\n    \"title\": \"a\",\n    \"version\": \"0.2.0\",\n    \"apiVersion\": \"9.1.1\"\n}\n"
        );
        let txt = std::fs::read_to_string(dir.path().join("notes.txt")).unwrap();
        assert!(txt.contains("0.1.0"));
    }

    #[test]
    fn api_version_field_is_independent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"version": "0.1.0", "apiVersion": "9.1.1"}"#,
        )
        .unwrap();
        let store = SchemaStore::new(dir.path());

        let report = set_version(
            &store,
            VersionField::ApiVersion,
            SchemaVersion::parse("9.2.0").unwrap(),
        )
        .unwrap();
        assert_eq!(report.updated.len(), 1);

        let body: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("a.json")).unwrap())
                .unwrap();
        assert_eq!(body["version"], "0.1.0");
        assert_eq!(body["apiVersion"], "9.2.0");
    }

    #[test]
    fn second_run_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"version": "0.1.0"}"#).unwrap();
        let store = SchemaStore::new(dir.path());
        let target = SchemaVersion::parse("1.0.0").unwrap();

        set_version(&store, VersionField::Version, target).unwrap();
        let again = set_version(&store, VersionField::Version, target).unwrap();
        assert!(again.updated.is_empty());
        assert_eq!(again.unchanged, ["a.json"]);
    }
}
