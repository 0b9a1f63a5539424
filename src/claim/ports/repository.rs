//! Repository ports for claims and work records.

use crate::claim::domain::{Claim, ClaimId, Work};
use crate::directory::domain::MemberId;
use crate::scheduling::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for claim repository operations.
pub type ClaimResult<T> = Result<T, ClaimRepositoryError>;

/// Claim persistence contract.
///
/// The store operation is the transactional boundary for claim creation:
/// the (task, member) uniqueness constraint and the claimant-cap check
/// both happen inside it, so two concurrent creations for the same pair,
/// or for a task at its cap, cannot both succeed. Service-level checks
/// are fast paths only.
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Stores a new claim, enforcing the (task, member) uniqueness
    /// constraint and the task's claimant cap in one transaction.
    ///
    /// `max_claimants` is the cap copied from the claimed task; only
    /// `Current` claims count against it.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimRepositoryError::DuplicateClaim`] when any claim
    /// record already exists for the (task, member) pair, or
    /// [`ClaimRepositoryError::ClaimCapReached`] when the task already
    /// has `max_claimants` current claims.
    async fn store(&self, claim: &Claim, max_claimants: u32) -> ClaimResult<()>;

    /// Persists changes to an existing claim (status, verification).
    ///
    /// # Errors
    ///
    /// Returns [`ClaimRepositoryError::ClaimNotFound`] when the claim
    /// does not exist.
    async fn update(&self, claim: &Claim) -> ClaimResult<()>;

    /// Deletes a claim record.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimRepositoryError::ClaimNotFound`] when the claim
    /// does not exist.
    async fn delete(&self, id: ClaimId) -> ClaimResult<()>;

    /// Finds a claim by identifier.
    ///
    /// Returns `None` when the claim does not exist.
    async fn find_by_id(&self, id: ClaimId) -> ClaimResult<Option<Claim>>;

    /// Returns all claim records for a task, regardless of status.
    async fn claims_for_task(&self, task: TaskId) -> ClaimResult<Vec<Claim>>;

    /// Returns the task's claims with `Current` status.
    async fn current_claims_for_task(&self, task: TaskId) -> ClaimResult<Vec<Claim>>;

    /// Returns all claim records held by a member, regardless of status.
    async fn claims_for_member(&self, member: MemberId) -> ClaimResult<Vec<Claim>>;
}

/// Work persistence contract. Append-only.
#[async_trait]
pub trait WorkRepository: Send + Sync {
    /// Appends a work record.
    async fn store(&self, work: &Work) -> ClaimResult<()>;

    /// Returns all work logged against a task.
    async fn works_for_task(&self, task: TaskId) -> ClaimResult<Vec<Work>>;

    /// Returns all work logged by a member.
    async fn works_for_member(&self, member: MemberId) -> ClaimResult<Vec<Work>>;
}

/// Errors returned by claim and work repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ClaimRepositoryError {
    /// A claim record already exists for the (task, member) pair.
    #[error("member {member} already has a claim record on task {task}")]
    DuplicateClaim {
        /// The claimed task.
        task: TaskId,
        /// The member with the prior claim.
        member: MemberId,
    },

    /// The task already has its maximum number of current claims.
    #[error("task {0} is fully claimed")]
    ClaimCapReached(TaskId),

    /// The claim was not found.
    #[error("claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ClaimRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
