//! # Schema Version Strings
//!
//! Every schema carries two top-level version fields: `version` (the
//! schema document's own revision) and `apiVersion` (the Notecard firmware
//! API it describes). Both are plain `X.Y.Z` strings; no pre-release or
//! build metadata is allowed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A strict `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
}

impl SchemaVersion {
    /// Parse `X.Y.Z` where each component is one or more ASCII digits.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3
            || parts
                .iter()
                .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(VersionError::Malformed(s.to_string()));
        }
        let component = |p: &str| {
            p.parse::<u64>().map_err(|_| VersionError::OutOfRange {
                version: s.to_string(),
                component: p.to_string(),
            })
        };
        Ok(Self {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SchemaVersion> for String {
    fn from(v: SchemaVersion) -> Self {
        v.to_string()
    }
}

/// Which top-level version field of a schema document to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionField {
    /// `version`: revision of the schema document itself.
    Version,
    /// `apiVersion`: Notecard firmware API revision.
    ApiVersion,
}

impl VersionField {
    /// The JSON key for this field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::ApiVersion => "apiVersion",
        }
    }
}

impl fmt::Display for VersionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_plain_semver() {
        let v = SchemaVersion::parse("9.1.1").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (9, 1, 1));
        assert_eq!(v.to_string(), "9.1.1");
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["", "1", "1.2", "1.2.3.4", "1.2.x", "v1.2.3", "1.2.3-rc1", "1..3", " 1.2.3"] {
            assert_eq!(
                SchemaVersion::parse(bad),
                Err(VersionError::Malformed(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflowing_component() {
        assert!(matches!(
            SchemaVersion::parse("99999999999999999999.0.0"),
            Err(VersionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn versions_order_numerically() {
        let a = SchemaVersion::parse("0.2.10").unwrap();
        let b = SchemaVersion::parse("0.10.0").unwrap();
        assert!(a < b);
    }

    #[test]
    fn field_keys() {
        assert_eq!(VersionField::Version.key(), "version");
        assert_eq!(VersionField::ApiVersion.key(), "apiVersion");
    }

    proptest! {
        #[test]
        fn display_parses_back(major in 0u64..10_000, minor in 0u64..10_000, patch in 0u64..10_000) {
            let v = SchemaVersion { major, minor, patch };
            prop_assert_eq!(SchemaVersion::parse(&v.to_string()).unwrap(), v);
        }
    }
}
