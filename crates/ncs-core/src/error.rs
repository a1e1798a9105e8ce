//! # Error Types
//!
//! Errors raised while parsing the catalog's naming and versioning
//! conventions. All errors use `thiserror` for derive-based `Display`
//! and `Error` implementations.

use thiserror::Error;

/// An API name or schema file name did not follow the catalog convention.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name was empty.
    #[error("name must not be empty")]
    Empty,

    /// An API name without a category prefix, e.g. `random` instead of `card.random`.
    #[error("API name '{0}' must contain at least one dot (e.g. 'card.random')")]
    MissingDot(String),

    /// A dot-separated segment was empty or contained a disallowed character.
    #[error("API name '{name}' has an invalid segment '{segment}'")]
    InvalidSegment {
        /// The full name that was rejected.
        name: String,
        /// The offending segment.
        segment: String,
    },

    /// A file name that does not end in `.req.notecard.api.json` or `.rsp.notecard.api.json`.
    #[error("'{0}' is not a request or response schema file name")]
    NotSchemaFile(String),

    /// A file name containing path separators or parent-directory components.
    #[error("'{0}' is not a plain file name")]
    UnsafeFileName(String),
}

/// A version string did not have the `X.Y.Z` shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not three dot-separated decimal components.
    #[error("'{0}' is not a valid semantic version (X.Y.Z)")]
    Malformed(String),

    /// A component does not fit in a `u64`.
    #[error("version component '{component}' in '{version}' is out of range")]
    OutOfRange {
        /// The full version string.
        version: String,
        /// The component that overflowed.
        component: String,
    },
}
