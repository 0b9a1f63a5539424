//! Repository port for members, tags, taggings, and worker profiles.

use crate::directory::domain::{Member, MemberId, Tag, TagId, Tagging, WorkerProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory repository operations.
pub type DirectoryResult<T> = Result<T, DirectoryRepositoryError>;

/// Membership roster and tag vocabulary persistence contract.
///
/// Tag membership must be current at evaluation time: eligibility
/// computation re-queries through this port on every evaluation rather
/// than caching.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Stores a new member and seeds their default worker profile.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateMember`] when the
    /// member ID already exists.
    async fn store_member(&self, member: &Member) -> DirectoryResult<()>;

    /// Finds a member by identifier.
    ///
    /// Returns `None` when the member does not exist.
    async fn find_member(&self, id: MemberId) -> DirectoryResult<Option<Member>>;

    /// Returns the identifiers of every member carrying the given tag.
    async fn members_with_tag(&self, tag: TagId) -> DirectoryResult<BTreeSet<MemberId>>;

    /// Returns the identifiers of members with no email address on file.
    async fn members_without_email(&self) -> DirectoryResult<BTreeSet<MemberId>>;

    /// Returns the identifiers of deactivated members.
    async fn inactive_members(&self) -> DirectoryResult<BTreeSet<MemberId>>;

    /// Returns the identifiers of members whose worker profile disables
    /// reminders.
    async fn members_with_nagging_disabled(&self) -> DirectoryResult<BTreeSet<MemberId>>;

    /// Returns the worker profile for a member.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::MemberNotFound`] when the member
    /// does not exist.
    async fn worker_profile(&self, member: MemberId) -> DirectoryResult<WorkerProfile>;

    /// Replaces a member's worker profile.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::MemberNotFound`] when the member
    /// does not exist.
    async fn update_worker_profile(&self, profile: WorkerProfile) -> DirectoryResult<()>;

    /// Stores a new tag.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateTagName`] when a tag
    /// with the same name already exists.
    async fn store_tag(&self, tag: &Tag) -> DirectoryResult<()>;

    /// Finds a tag by identifier.
    ///
    /// Returns `None` when the tag does not exist.
    async fn find_tag(&self, id: TagId) -> DirectoryResult<Option<Tag>>;

    /// Stores a new tagging.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateTagging`] when the
    /// (member, tag) pair is already tagged.
    async fn store_tagging(&self, tagging: &Tagging) -> DirectoryResult<()>;

    /// Removes the tagging for a (member, tag) pair.
    ///
    /// Returns `true` when a tagging was removed, `false` when none
    /// existed.
    async fn remove_tagging(&self, member: MemberId, tag: TagId) -> DirectoryResult<bool>;

    /// Returns all taggings held by a member.
    async fn taggings_for_member(&self, member: MemberId) -> DirectoryResult<Vec<Tagging>>;

    /// Returns taggings created in `[start, end)`.
    async fn taggings_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DirectoryResult<Vec<Tagging>>;
}

/// Errors returned by directory repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryRepositoryError {
    /// A member with the same identifier already exists.
    #[error("duplicate member identifier: {0}")]
    DuplicateMember(MemberId),

    /// A tag with the same name already exists.
    #[error("duplicate tag name: {0}")]
    DuplicateTagName(String),

    /// The (member, tag) pair is already tagged.
    #[error("member {member} already tagged with {tag}")]
    DuplicateTagging {
        /// The member tagged.
        member: MemberId,
        /// The tag already attached.
        tag: TagId,
    },

    /// The member was not found.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// The tag was not found.
    #[error("tag not found: {0}")]
    TagNotFound(TagId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
