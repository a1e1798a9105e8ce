//! # Reference Registry
//!
//! Builds the per-session map from URI to schema document that lets the
//! validator resolve every `$ref` of a root schema without network access.
//!
//! ## Resolution policy
//!
//! Only the root's top-level `oneOf` is walked, and only entries whose
//! `$ref` is an absolute `http`/`https` URL. For each such URI the final
//! path segment names a candidate local file, which a [`Resolve`]
//! implementation turns into a document:
//!
//! - found: registered under its declared `$id` (or the URI, if it has no
//!   `$id`); when the `$id` differs from the URI the URI is registered as an
//!   alias so the root's own `$ref` still resolves.
//! - absent: recorded as a [`SkippedReference`] and logged. An incomplete
//!   local mirror stays usable for every other branch.
//! - present but unparsable: the build fails with
//!   [`RegistryError::Satellite`]. A corrupt file is an authoring defect.
//!
//! Keys are normalized with [`normalize_uri`]: the host is lowercased and
//! the fragment dropped, matching the document URI the validator asks for.
//! A reference into a registered document (`<root $id>#/$defs/x`) therefore
//! needs no lookup of its own.
//!
//! Insertion is first-insert-wins. The root is always inserted first, so a
//! satellite that declares the root's `$id` can never shadow it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use ncs_core::is_filename_safe;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::document::SchemaDocument;
use crate::store::{SchemaStore, StoreError};

/// Registry key for `uri`: the parsed URL without its fragment, so
/// `https://EXAMPLE.com/a.json#` and `https://example.com/a.json` coincide.
/// Anything that does not parse as an absolute URL only loses its fragment.
pub fn normalize_uri(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.into()
        }
        Err(_) => uri.split('#').next().unwrap_or(uri).to_string(),
    }
}

/// Final path segment of an absolute URL, if it is a plain file name.
///
/// `https://example.com` and `https://example.com/dir/` have none.
pub fn reference_file_name(uri: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    let segment = url.path_segments()?.last()?;
    is_filename_safe(segment).then(|| segment.to_string())
}

/// Copy of `body` whose top-level `$id`, if any, is normalized.
pub(crate) fn with_normalized_id(body: &Value) -> Value {
    let mut body = body.clone();
    let id = body.get("$id").and_then(Value::as_str).map(normalize_uri);
    if let (Some(id), Some(map)) = (id, body.as_object_mut()) {
        map.insert("$id".to_string(), Value::String(id));
    }
    body
}

/// Turns a `$ref` URI into a schema document.
///
/// `Ok(None)` means the document is not available from this source and the
/// reference should be soft-skipped. `Err` is reserved for documents that
/// exist but cannot be used.
pub trait Resolve {
    /// Look up the document behind `uri`.
    fn resolve(&self, uri: &str) -> Result<Option<SchemaDocument>, StoreError>;
}

impl<F> Resolve for F
where
    F: Fn(&str) -> Result<Option<SchemaDocument>, StoreError>,
{
    fn resolve(&self, uri: &str) -> Result<Option<SchemaDocument>, StoreError> {
        self(uri)
    }
}

/// Resolves a URI to the store file named by its final path segment.
#[derive(Debug, Clone, Copy)]
pub struct LocalResolver<'a> {
    store: &'a SchemaStore,
}

impl<'a> LocalResolver<'a> {
    /// Resolve against `store`.
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }
}

impl Resolve for LocalResolver<'_> {
    fn resolve(&self, uri: &str) -> Result<Option<SchemaDocument>, StoreError> {
        let Some(file_name) = reference_file_name(uri) else {
            return Ok(None);
        };
        match self.store.load(&file_name) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Why a catalog reference was left out of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The URI has no usable final path segment.
    NoFileName,
    /// The resolver has no document for the URI.
    Absent {
        /// The local file name that was looked for.
        file_name: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFileName => f.write_str("URI has no file name"),
            Self::Absent { file_name } => write!(f, "{file_name} is not available locally"),
        }
    }
}

/// A catalog reference that was soft-skipped during the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedReference {
    /// The `$ref` URI as written in the root.
    pub uri: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

impl fmt::Display for SkippedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.uri, self.reason)
    }
}

/// Outcome of [`Registry::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The URI was new and now maps to the document.
    Inserted,
    /// The URI was already registered; the existing entry was kept.
    AlreadyPresent,
}

/// Errors that abort a registry build.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The root schema itself could not be loaded.
    #[error("could not load root schema: {0}")]
    Root(#[source] StoreError),

    /// A referenced schema exists but could not be loaded.
    #[error("could not load referenced schema {uri}: {source}")]
    Satellite {
        /// The `$ref` URI from the root.
        uri: String,
        /// What went wrong loading it.
        source: StoreError,
    },
}

/// URI → document map for one validation session.
///
/// Cheap to clone: documents are shared behind `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: BTreeMap<String, Arc<SchemaDocument>>,
    skipped: Vec<SkippedReference>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `doc` under the normalized `uri` unless it is already taken.
    pub fn insert(&mut self, uri: &str, doc: Arc<SchemaDocument>) -> Insertion {
        match self.entries.entry(normalize_uri(uri)) {
            std::collections::btree_map::Entry::Occupied(_) => Insertion::AlreadyPresent,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(doc);
                Insertion::Inserted
            }
        }
    }

    /// The document `uri` resolves to.
    pub fn get(&self, uri: &str) -> Option<&SchemaDocument> {
        self.entries.get(&normalize_uri(uri)).map(Arc::as_ref)
    }

    /// True if `uri` resolves.
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(&normalize_uri(uri))
    }

    /// Number of registered URIs, aliases included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys in sorted order, normalized.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// References that were soft-skipped, in catalog order.
    pub fn skipped(&self) -> &[SkippedReference] {
        &self.skipped
    }

    /// True if `uri` was soft-skipped during the build.
    pub fn is_skipped(&self, uri: &str) -> bool {
        let key = normalize_uri(uri);
        self.skipped.iter().any(|s| normalize_uri(&s.uri) == key)
    }

    /// Owned copies of every registered body, keyed by URI, for handing to
    /// the validator's retriever.
    pub(crate) fn bodies(&self) -> HashMap<String, Value> {
        self.entries
            .iter()
            .map(|(uri, doc)| (uri.clone(), with_normalized_id(doc.body())))
            .collect()
    }

    fn register_satellite(&mut self, uri: &str, doc: SchemaDocument) {
        let doc = Arc::new(doc);
        let identity = normalize_uri(doc.identity().unwrap_or(uri));
        if self.insert(&identity, Arc::clone(&doc)) == Insertion::AlreadyPresent {
            tracing::warn!(
                identity = %identity,
                schema = doc.name(),
                "identity already registered; keeping the earlier document"
            );
        } else {
            tracing::debug!(identity = %identity, schema = doc.name(), "registered schema");
        }
        if identity != normalize_uri(uri) && self.insert(uri, doc) == Insertion::Inserted {
            tracing::debug!(uri, identity = %identity, "registered reference alias");
        }
    }
}

/// A root document together with the registry built from it.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// The root document.
    pub document: SchemaDocument,
    /// Everything its references resolved to.
    pub registry: Registry,
}

fn is_absolute_http(uri: &str) -> bool {
    Url::parse(uri)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Build the registry for `root`, resolving its catalog references with
/// `resolver`.
///
/// References are processed in `oneOf` order. Building twice from the same
/// root yields equal registries.
///
/// # Errors
///
/// Returns [`RegistryError::Satellite`] if the resolver reports a hard
/// failure (e.g. a present but unparsable file). Absent documents are not
/// errors.
pub fn build_registry(
    root: &SchemaDocument,
    resolver: &impl Resolve,
) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();

    if let Some(id) = root.identity() {
        registry.insert(id, Arc::new(root.clone()));
    }

    for uri in root.references() {
        if !is_absolute_http(uri) {
            tracing::debug!(uri = %uri, "leaving non-HTTP reference to the validator");
            continue;
        }
        if registry.contains(uri) || registry.is_skipped(uri) {
            tracing::debug!(uri = %uri, "reference already covered");
            continue;
        }
        let Some(file_name) = reference_file_name(uri) else {
            tracing::warn!(uri = %uri, "reference has no file name; skipping");
            registry.skipped.push(SkippedReference {
                uri: uri.clone(),
                reason: SkipReason::NoFileName,
            });
            continue;
        };
        match resolver.resolve(uri) {
            Ok(Some(doc)) => registry.register_satellite(uri, doc),
            Ok(None) => {
                tracing::warn!(
                    uri = %uri,
                    file = %file_name,
                    "referenced schema not available locally; skipping"
                );
                registry.skipped.push(SkippedReference {
                    uri: uri.clone(),
                    reason: SkipReason::Absent { file_name },
                });
            }
            Err(source) => {
                return Err(RegistryError::Satellite {
                    uri: uri.clone(),
                    source,
                })
            }
        }
    }

    Ok(registry)
}

/// Load `name` from `store` and build its registry from local files.
///
/// # Errors
///
/// [`RegistryError::Root`] if `name` itself cannot be loaded (a missing root
/// is fatal), or any error from [`build_registry`].
pub fn resolve_schema(store: &SchemaStore, name: &str) -> Result<ResolvedSchema, RegistryError> {
    let document = store.load(name).map_err(RegistryError::Root)?;
    let registry = build_registry(&document, &LocalResolver::new(store))?;
    tracing::debug!(
        schema = name,
        registered = registry.len(),
        skipped = registry.skipped().len(),
        "built reference registry"
    );
    Ok(ResolvedSchema { document, registry })
}
