//! Error types for directory domain validation.

use thiserror::Error;

/// Errors returned while constructing directory domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryDomainError {
    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// The email address is not plausibly deliverable.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The tag name is empty after trimming.
    #[error("tag name must not be empty")]
    EmptyTagName,
}
