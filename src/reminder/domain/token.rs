//! Single-use bearer tokens for reminder links.
//!
//! Tokens are opaque bearer credentials embedded in reminder URLs. Only
//! the one-way digest is ever persisted; the raw token exists just long
//! enough to be rendered into an outbound message, and its `Debug`
//! representation is redacted so it cannot leak into logs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// An opaque single-use bearer token.
pub struct AuthToken(String);

impl AuthToken {
    /// Generates a fresh random token from two UUIDs' hex forms.
    #[must_use]
    pub fn generate() -> Self {
        let mut raw = String::with_capacity(64);
        raw.push_str(&Uuid::new_v4().simple().to_string());
        raw.push_str(&Uuid::new_v4().simple().to_string());
        Self(raw)
    }

    /// Generates tokens until `is_unique` accepts the digest.
    ///
    /// This is the collision-regeneration path: a digest collision is
    /// handled by silently trying again, never by surfacing an error.
    #[must_use]
    pub fn generate_unique(mut is_unique: impl FnMut(&TokenDigest) -> bool) -> Self {
        loop {
            let token = Self::generate();
            if is_unique(&token.digest()) {
                return token;
            }
        }
    }

    /// Returns the raw token for embedding in an outbound message.
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.0
    }

    /// Returns the one-way digest stored in place of the raw token.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        let hash = Sha256::digest(self.0.as_bytes());
        TokenDigest(format!("{hash:x}"))
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of an auth token.
///
/// Digest uniqueness across all stored nags is what makes tokens
/// single-use identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Returns the digest as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
