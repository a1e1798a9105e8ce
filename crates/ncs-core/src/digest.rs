//! # Content Digest
//!
//! SHA-256 digests of raw schema file bytes. Used as the freshness key of
//! the optional parsed-document cache: a cached document is served only if
//! the file on disk still hashes to the digest it was parsed from.

use sha2::{Digest, Sha256};

/// A SHA-256 digest of file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute the SHA-256 digest of `bytes`.
pub fn sha256_digest(bytes: &[u8]) -> ContentDigest {
    ContentDigest(Sha256::digest(bytes).into())
}
