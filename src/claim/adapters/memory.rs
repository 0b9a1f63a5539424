//! In-memory claim and work repositories.
//!
//! Uniqueness and cap checks run under the claim store's write lock, so
//! concurrent claim creation cannot exceed the cap or double-claim.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::claim::{
    domain::{Claim, ClaimId, ClaimStatus, Work, WorkId},
    ports::{ClaimRepository, ClaimRepositoryError, ClaimResult, WorkRepository},
};
use crate::directory::domain::MemberId;
use crate::scheduling::domain::TaskId;

fn lock_error(err: impl std::fmt::Display) -> ClaimRepositoryError {
    ClaimRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Thread-safe in-memory claim repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClaimRepository {
    state: Arc<RwLock<InMemoryClaimState>>,
}

#[derive(Debug, Default)]
struct InMemoryClaimState {
    claims: HashMap<ClaimId, Claim>,
    pair_index: HashMap<(TaskId, MemberId), ClaimId>,
}

impl InMemoryClaimRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryClaimState {
    fn current_count(&self, task: TaskId) -> u32 {
        let count = self
            .claims
            .values()
            .filter(|claim| claim.task() == task && claim.status() == ClaimStatus::Current)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn store(&self, claim: &Claim, max_claimants: u32) -> ClaimResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let key = (claim.task(), claim.member());
        if state.pair_index.contains_key(&key) {
            return Err(ClaimRepositoryError::DuplicateClaim {
                task: claim.task(),
                member: claim.member(),
            });
        }
        if claim.status() == ClaimStatus::Current
            && state.current_count(claim.task()) >= max_claimants
        {
            return Err(ClaimRepositoryError::ClaimCapReached(claim.task()));
        }
        state.pair_index.insert(key, claim.id());
        state.claims.insert(claim.id(), claim.clone());
        Ok(())
    }

    async fn update(&self, claim: &Claim) -> ClaimResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.claims.contains_key(&claim.id()) {
            return Err(ClaimRepositoryError::ClaimNotFound(claim.id()));
        }
        state.claims.insert(claim.id(), claim.clone());
        Ok(())
    }

    async fn delete(&self, id: ClaimId) -> ClaimResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let claim = state
            .claims
            .remove(&id)
            .ok_or(ClaimRepositoryError::ClaimNotFound(id))?;
        state.pair_index.remove(&(claim.task(), claim.member()));
        Ok(())
    }

    async fn find_by_id(&self, id: ClaimId) -> ClaimResult<Option<Claim>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.claims.get(&id).cloned())
    }

    async fn claims_for_task(&self, task: TaskId) -> ClaimResult<Vec<Claim>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .claims
            .values()
            .filter(|claim| claim.task() == task)
            .cloned()
            .collect())
    }

    async fn current_claims_for_task(&self, task: TaskId) -> ClaimResult<Vec<Claim>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .claims
            .values()
            .filter(|claim| claim.task() == task && claim.status() == ClaimStatus::Current)
            .cloned()
            .collect())
    }

    async fn claims_for_member(&self, member: MemberId) -> ClaimResult<Vec<Claim>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .claims
            .values()
            .filter(|claim| claim.member() == member)
            .cloned()
            .collect())
    }
}

/// Thread-safe in-memory work repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkRepository {
    state: Arc<RwLock<HashMap<WorkId, Work>>>,
}

impl InMemoryWorkRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkRepository for InMemoryWorkRepository {
    async fn store(&self, work: &Work) -> ClaimResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.insert(work.id(), work.clone());
        Ok(())
    }

    async fn works_for_task(&self, task: TaskId) -> ClaimResult<Vec<Work>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .values()
            .filter(|work| work.task() == task)
            .cloned()
            .collect())
    }

    async fn works_for_member(&self, member: MemberId) -> ClaimResult<Vec<Work>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .values()
            .filter(|work| work.worker() == member)
            .cloned()
            .collect())
    }
}
