//! # Catalog Naming Conventions
//!
//! Newtypes for API command names and schema file names. A schema file
//! name is always `<api-name>.<req|rsp>.notecard.api.json`, and the same
//! string is the final path segment of the schema's canonical `$id`:
//!
//! ```text
//! https://raw.githubusercontent.com/blues/notecard-schema/master/card.random.req.notecard.api.json
//! \______________________________________________________________/\__________________________________/
//!                        SCHEMA_URI_BASE                                    SchemaFileName
//! ```
//!
//! Parsing is strict: a name that does not round-trip through
//! [`SchemaFileName::file_name`] is rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// Canonical URI prefix under which every catalog schema declares its `$id`.
pub const SCHEMA_URI_BASE: &str = "https://raw.githubusercontent.com/blues/notecard-schema/master/";

/// File name of the root dispatch catalog.
pub const CATALOG_FILE_NAME: &str = "notecard.api.json";

/// Suffix shared by every request and response schema file.
pub const SCHEMA_FILE_SUFFIX: &str = ".notecard.api.json";

/// Meta-schema URI declared by every schema in the catalog.
pub const JSON_SCHEMA_DRAFT_URI: &str = "https://json-schema.org/draft/2020-12/schema";

/// A dot-separated Notecard API command name such as `card.random`.
///
/// Every segment is non-empty and made of ASCII alphanumerics, `_` or `-`.
/// At least two segments are required: the first is the request category
/// (`card`, `hub`, `note`, `web`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiName(String);

impl ApiName {
    /// Validate and wrap an API name.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if !name.contains('.') {
            return Err(NameError::MissingDot(name));
        }
        for segment in name.split('.') {
            let ok = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !ok {
                return Err(NameError::InvalidSegment {
                    segment: segment.to_string(),
                    name,
                });
            }
        }
        Ok(Self(name))
    }

    /// The raw name, e.g. `card.random`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The request category, i.e. the first segment (`card` for `card.random`).
    pub fn category(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// The name with dots replaced by underscores (`card_random`).
    pub fn snake_case(&self) -> String {
        self.0.replace('.', "_")
    }
}

impl fmt::Display for ApiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ApiName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ApiName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiName> for String {
    fn from(name: ApiName) -> Self {
        name.0
    }
}

/// Direction of a message described by a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Host-to-Notecard request (`.req.`).
    Request,
    /// Notecard-to-host response (`.rsp.`).
    Response,
}

impl MessageKind {
    /// The infix used in file names: `req` or `rsp`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "req",
            Self::Response => "rsp",
        }
    }

    /// Human-readable label used in schema titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Response => "Response",
        }
    }

    fn from_infix(infix: &str) -> Option<Self> {
        match infix {
            "req" => Some(Self::Request),
            "rsp" => Some(Self::Response),
            _ => None,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `<api-name>.<req|rsp>.notecard.api.json` file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaFileName {
    api: ApiName,
    kind: MessageKind,
}

impl SchemaFileName {
    /// Build the file name for an API and direction.
    pub fn new(api: ApiName, kind: MessageKind) -> Self {
        Self { api, kind }
    }

    /// Parse a file name such as `card.random.req.notecard.api.json`.
    pub fn parse(file_name: &str) -> Result<Self, NameError> {
        let stem = file_name
            .strip_suffix(SCHEMA_FILE_SUFFIX)
            .ok_or_else(|| NameError::NotSchemaFile(file_name.to_string()))?;
        let (api, infix) = stem
            .rsplit_once('.')
            .ok_or_else(|| NameError::NotSchemaFile(file_name.to_string()))?;
        let kind = MessageKind::from_infix(infix)
            .ok_or_else(|| NameError::NotSchemaFile(file_name.to_string()))?;
        Ok(Self {
            api: ApiName::new(api)?,
            kind,
        })
    }

    /// The API this schema describes.
    pub fn api(&self) -> &ApiName {
        &self.api
    }

    /// Request or response.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The on-disk file name.
    pub fn file_name(&self) -> String {
        format!("{}.{}{SCHEMA_FILE_SUFFIX}", self.api, self.kind)
    }

    /// The canonical `$id` URI under the given base (which must end in `/`).
    pub fn uri(&self, base: &str) -> String {
        format!("{base}{}", self.file_name())
    }
}

impl fmt::Display for SchemaFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

impl FromStr for SchemaFileName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// True if `name` can be joined onto a directory without escaping it.
pub fn is_filename_safe(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn api_name_accepts_dotted_names() {
        let name = ApiName::new("card.aux.serial").unwrap();
        assert_eq!(name.as_str(), "card.aux.serial");
        assert_eq!(name.category(), "card");
        assert_eq!(name.snake_case(), "card_aux_serial");
    }

    #[test]
    fn api_name_rejects_missing_dot() {
        assert_eq!(
            ApiName::new("random"),
            Err(NameError::MissingDot("random".to_string()))
        );
        assert_eq!(ApiName::new(""), Err(NameError::Empty));
    }

    #[test]
    fn api_name_rejects_bad_segments() {
        assert!(matches!(
            ApiName::new("card..random"),
            Err(NameError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ApiName::new("card.ran dom"),
            Err(NameError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ApiName::new("../etc.passwd"),
            Err(NameError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn api_name_serde_validates() {
        let ok: ApiName = serde_json::from_str("\"hub.set\"").unwrap();
        assert_eq!(ok.as_str(), "hub.set");
        assert!(serde_json::from_str::<ApiName>("\"hub\"").is_err());
    }

    #[test]
    fn schema_file_name_parses_request_and_response() {
        let req = SchemaFileName::parse("card.binary.get.req.notecard.api.json").unwrap();
        assert_eq!(req.api().as_str(), "card.binary.get");
        assert_eq!(req.kind(), MessageKind::Request);

        let rsp = SchemaFileName::parse("card.random.rsp.notecard.api.json").unwrap();
        assert_eq!(rsp.kind(), MessageKind::Response);
        assert_eq!(
            rsp.uri(SCHEMA_URI_BASE),
            "https://raw.githubusercontent.com/blues/notecard-schema/master/card.random.rsp.notecard.api.json"
        );
    }

    #[test]
    fn catalog_is_not_a_schema_file() {
        assert!(matches!(
            SchemaFileName::parse(CATALOG_FILE_NAME),
            Err(NameError::NotSchemaFile(_))
        ));
        assert!(SchemaFileName::parse("card.random.foo.notecard.api.json").is_err());
        assert!(SchemaFileName::parse("card.random.req.json").is_err());
    }

    #[test]
    fn filename_safety() {
        assert!(is_filename_safe("notecard.api.json"));
        assert!(!is_filename_safe("../notecard.api.json"));
        assert!(!is_filename_safe("sub/notecard.api.json"));
        assert!(!is_filename_safe(""));
    }

    proptest! {
        #[test]
        fn schema_file_names_round_trip(
            segments in proptest::collection::vec("[a-z][a-z0-9_]{0,8}", 2..5),
            request in any::<bool>(),
        ) {
            let api = ApiName::new(segments.join(".")).unwrap();
            let kind = if request { MessageKind::Request } else { MessageKind::Response };
            let name = SchemaFileName::new(api, kind);
            let parsed = SchemaFileName::parse(&name.file_name()).unwrap();
            prop_assert_eq!(parsed, name);
        }
    }
}
