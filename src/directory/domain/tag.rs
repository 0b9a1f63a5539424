//! Tags and the taggings that attach them to members.

use super::{DirectoryDomainError, MemberId, TagId, TaggingId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A tag represents some attribute of a member, such as a skill, a shop
/// role, or a shop permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: String,
    meaning: String,
}

impl Tag {
    /// Creates a tag with the given name and semantics discussion.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyTagName`] when the name is
    /// empty after trimming.
    pub fn new(
        name: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Result<Self, DirectoryDomainError> {
        let normalized = name.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(DirectoryDomainError::EmptyTagName);
        }
        Ok(Self {
            id: TagId::new(),
            name: normalized,
            meaning: meaning.into(),
        })
    }

    /// Returns the tag identifier.
    #[must_use]
    pub const fn id(&self) -> TagId {
        self.id
    }

    /// Returns the tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the discussion of the tag's semantics.
    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }
}

/// The attachment of one tag to one member.
///
/// At most one tagging exists per (member, tag) pair; the repository
/// enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagging {
    /// Tagging record identifier.
    pub id: TaggingId,
    /// The member tagged.
    pub member: MemberId,
    /// The tag assigned to the member.
    pub tag: TagId,
    /// The member that authorized the tagging, if recorded.
    pub authorizing_member: Option<MemberId>,
    /// Whether the tagged member may in turn grant this tag to others.
    pub can_tag: bool,
    /// When the member was tagged.
    pub date_tagged: DateTime<Utc>,
}

impl Tagging {
    /// Creates a tagging stamped with the clock's current time.
    #[must_use]
    pub fn new(
        member: MemberId,
        tag: TagId,
        authorizing_member: Option<MemberId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaggingId::new(),
            member,
            tag,
            authorizing_member,
            can_tag: false,
            date_tagged: clock.utc(),
        }
    }

    /// Marks the tagged member as able to grant this tag to others.
    #[must_use]
    pub const fn with_can_tag(mut self) -> Self {
        self.can_tag = true;
        self
    }
}
