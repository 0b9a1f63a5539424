//! Member records and worker nag-preference profiles.

use super::{DirectoryDomainError, MemberId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated email address.
///
/// Validation is deliberately shallow: the directory only needs to know
/// whether an address is plausibly deliverable before a reminder is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::InvalidEmail`] when the value is
    /// empty or lacks a local part or domain around a single `@`.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let mut segments = normalized.split('@');
        let local = segments.next().unwrap_or_default();
        let domain = segments.next().unwrap_or_default();
        let has_more_segments = segments.next().is_some();
        let is_valid = !local.is_empty()
            && !domain.is_empty()
            && !has_more_segments
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(DirectoryDomainError::InvalidEmail(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    username: String,
    first_name: String,
    last_name: String,
    email: Option<EmailAddress>,
    is_active: bool,
}

impl Member {
    /// Creates an active member with the given username.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyUsername`] when the username is
    /// empty after trimming.
    pub fn new(username: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let normalized = username.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(DirectoryDomainError::EmptyUsername);
        }
        Ok(Self {
            id: MemberId::new(),
            username: normalized,
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            is_active: true,
        })
    }

    /// Sets the member's name.
    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Sets the member's email address.
    #[must_use]
    pub fn with_email(mut self, email: EmailAddress) -> Self {
        self.email = Some(email);
        self
    }

    /// Marks the member as deactivated.
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Returns the member identifier.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the first name, possibly empty.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the last name, possibly empty.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Friendly name is the member's first name, falling back to the
    /// username when no first name is on file.
    #[must_use]
    pub fn friendly_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.username
        } else {
            &self.first_name
        }
    }

    /// Returns the email address, if any.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Returns whether the member is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Per-member worker preferences.
///
/// A profile exists for every member; the directory adapter seeds one with
/// defaults when the member is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProfile {
    /// The member to whom this profile applies.
    pub member: MemberId,
    /// Whether the member is willing to receive work reminders.
    pub should_nag: bool,
}

impl WorkerProfile {
    /// Creates the default profile for a member: reminders enabled.
    #[must_use]
    pub const fn new(member: MemberId) -> Self {
        Self {
            member,
            should_nag: true,
        }
    }
}
