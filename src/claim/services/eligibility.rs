//! Eligibility-set computation.
//!
//! Pure set algebra over member-identifier sets fetched through the
//! directory and claim ports. Tag membership is re-queried on every
//! evaluation; nothing here caches.

use crate::claim::domain::Claim;
use crate::claim::ports::{ClaimRepository, ClaimRepositoryError};
use crate::directory::domain::MemberId;
use crate::directory::ports::{DirectoryRepositoryError, MemberDirectory};
use crate::scheduling::domain::{Task, TaskDescriptor};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for eligibility computation.
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),
    /// Claim lookup failed.
    #[error(transparent)]
    Claims(#[from] ClaimRepositoryError),
}

/// Result type for eligibility operations.
pub type EligibilityResult<T> = Result<T, EligibilityError>;

/// Computes who may claim a task-like entity.
#[derive(Clone)]
pub struct EligibilityService<D, CR>
where
    D: MemberDirectory,
    CR: ClaimRepository,
{
    directory: Arc<D>,
    claims: Arc<CR>,
}

impl<D, CR> EligibilityService<D, CR>
where
    D: MemberDirectory,
    CR: ClaimRepository,
{
    /// Creates a new eligibility service.
    #[must_use]
    pub const fn new(directory: Arc<D>, claims: Arc<CR>) -> Self {
        Self { directory, claims }
    }

    /// Returns every member allowed to claim the described entity: the
    /// explicit eligible-claimant list unioned with every member carrying
    /// any of the eligible tags.
    ///
    /// Works for templates and tasks alike since both embed a
    /// [`TaskDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError::Directory`] when a tag-membership
    /// lookup fails.
    pub async fn eligible_members(
        &self,
        descriptor: &TaskDescriptor,
    ) -> EligibilityResult<BTreeSet<MemberId>> {
        let mut pool = descriptor.eligible_claimants.clone();
        for tag in &descriptor.eligible_tags {
            pool.extend(self.directory.members_with_tag(*tag).await?);
        }
        Ok(pool)
    }

    /// Returns the members explicitly marked uninterested.
    #[must_use]
    pub fn uninterested_members(&self, descriptor: &TaskDescriptor) -> BTreeSet<MemberId> {
        descriptor.uninterested.clone()
    }

    /// Returns the members holding a `Current` claim on the task.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError::Claims`] when the claim lookup fails.
    pub async fn current_claimants(
        &self,
        task: &Task,
    ) -> EligibilityResult<BTreeSet<MemberId>> {
        let claims = self.claims.current_claims_for_task(task.id()).await?;
        Ok(claims.iter().map(Claim::member).collect())
    }

    /// Returns whether the task's current claims have reached its cap.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError::Claims`] when the claim lookup fails.
    pub async fn is_fully_claimed(&self, task: &Task) -> EligibilityResult<bool> {
        let claimants = self.current_claimants(task).await?;
        let count = u32::try_from(claimants.len()).unwrap_or(u32::MAX);
        Ok(count >= task.descriptor().max_claimants)
    }
}
