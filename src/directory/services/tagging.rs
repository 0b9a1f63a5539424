//! Permission-checked granting and revoking of tags.
//!
//! Only a member holding a `can_tag` tagging for a tag may grant or revoke
//! that tag. Permission is re-queried on every call; there is no cached
//! notion of "who may tag".

use crate::directory::{
    domain::{MemberId, TagId, Tagging},
    ports::{DirectoryRepositoryError, MemberDirectory},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for tagging operations.
#[derive(Debug, Error)]
pub enum TaggingServiceError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] DirectoryRepositoryError),
}

/// Result type for tagging service operations.
pub type TaggingServiceResult<T> = Result<T, TaggingServiceError>;

/// Tag-granting service.
#[derive(Clone)]
pub struct TaggingService<D, C>
where
    D: MemberDirectory,
    C: Clock + Send + Sync,
{
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<D, C> TaggingService<D, C>
where
    D: MemberDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new tagging service.
    #[must_use]
    pub const fn new(directory: Arc<D>, clock: Arc<C>) -> Self {
        Self { directory, clock }
    }

    /// Returns whether `member` may grant `tag` to others.
    ///
    /// # Errors
    ///
    /// Returns [`TaggingServiceError::Repository`] when the lookup fails.
    pub async fn can_tag_with(
        &self,
        member: MemberId,
        tag: TagId,
    ) -> TaggingServiceResult<bool> {
        let taggings = self.directory.taggings_for_member(member).await?;
        Ok(taggings
            .iter()
            .any(|tagging| tagging.tag == tag && tagging.can_tag))
    }

    /// Grants `tag` to `taggee` when `tagger` holds the granting
    /// permission and the taggee is not already tagged.
    ///
    /// Returns the created tagging, or `None` when nothing was done (no
    /// permission, or already tagged).
    ///
    /// # Errors
    ///
    /// Returns [`TaggingServiceError::Repository`] when a lookup or store
    /// fails.
    pub async fn grant_if_permitted(
        &self,
        tagger: MemberId,
        taggee: MemberId,
        tag: TagId,
    ) -> TaggingServiceResult<Option<Tagging>> {
        if !self.can_tag_with(tagger, tag).await? {
            return Ok(None);
        }
        let existing = self.directory.taggings_for_member(taggee).await?;
        if existing.iter().any(|tagging| tagging.tag == tag) {
            return Ok(None);
        }
        let tagging = Tagging::new(taggee, tag, Some(tagger), &*self.clock);
        self.directory.store_tagging(&tagging).await?;
        Ok(Some(tagging))
    }

    /// Revokes `tag` from `taggee` when `tagger` holds the granting
    /// permission.
    ///
    /// Returns `true` when a tagging was removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaggingServiceError::Repository`] when a lookup or
    /// removal fails.
    pub async fn revoke_if_permitted(
        &self,
        tagger: MemberId,
        taggee: MemberId,
        tag: TagId,
    ) -> TaggingServiceResult<bool> {
        if !self.can_tag_with(tagger, tag).await? {
            return Ok(false);
        }
        Ok(self.directory.remove_tagging(taggee, tag).await?)
    }
}
