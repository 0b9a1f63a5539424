//! Repository port for nag records.

use crate::directory::domain::MemberId;
use crate::reminder::domain::{Nag, NagId, TokenDigest};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for nag repository operations.
pub type NagResult<T> = Result<T, NagRepositoryError>;

/// Nag persistence contract.
///
/// The token-digest uniqueness constraint enforced here is what makes
/// tokens single-use; the planner regenerates on collision rather than
/// surfacing the error.
#[async_trait]
pub trait NagRepository: Send + Sync {
    /// Stores a new nag record.
    ///
    /// # Errors
    ///
    /// Returns [`NagRepositoryError::DuplicateTokenDigest`] when another
    /// nag already stores the same digest.
    async fn store(&self, nag: &Nag) -> NagResult<()>;

    /// Returns whether any stored nag carries the given token digest.
    async fn digest_exists(&self, digest: &TokenDigest) -> NagResult<bool>;

    /// Finds a nag by identifier.
    ///
    /// Returns `None` when the nag does not exist.
    async fn find_by_id(&self, id: NagId) -> NagResult<Option<Nag>>;

    /// Finds a nag by its token digest, for token redemption.
    ///
    /// Returns `None` when no nag carries the digest.
    async fn find_by_digest(&self, digest: &TokenDigest) -> NagResult<Option<Nag>>;

    /// Returns all nags recorded for a member.
    async fn nags_for_member(&self, member: MemberId) -> NagResult<Vec<Nag>>;
}

/// Errors returned by nag repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NagRepositoryError {
    /// A nag with the same identifier already exists.
    #[error("duplicate nag identifier: {0}")]
    DuplicateNag(NagId),

    /// Another nag already stores the same token digest.
    #[error("duplicate token digest")]
    DuplicateTokenDigest,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NagRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
