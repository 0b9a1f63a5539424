//! In-memory nag repository and a notifier that records instead of
//! sending.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::directory::domain::MemberId;
use crate::reminder::{
    domain::{Nag, NagId, TokenDigest},
    ports::{NagRepository, NagRepositoryError, NagResult, Notifier, NotifierError, OutboundEmail},
};

fn lock_error(err: impl std::fmt::Display) -> NagRepositoryError {
    NagRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Thread-safe in-memory nag repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNagRepository {
    state: Arc<RwLock<InMemoryNagState>>,
}

#[derive(Debug, Default)]
struct InMemoryNagState {
    nags: HashMap<NagId, Nag>,
    digest_index: HashMap<TokenDigest, NagId>,
}

impl InMemoryNagRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NagRepository for InMemoryNagRepository {
    async fn store(&self, nag: &Nag) -> NagResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.nags.contains_key(&nag.id()) {
            return Err(NagRepositoryError::DuplicateNag(nag.id()));
        }
        if state.digest_index.contains_key(nag.token_digest()) {
            return Err(NagRepositoryError::DuplicateTokenDigest);
        }
        state
            .digest_index
            .insert(nag.token_digest().clone(), nag.id());
        state.nags.insert(nag.id(), nag.clone());
        Ok(())
    }

    async fn digest_exists(&self, digest: &TokenDigest) -> NagResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.digest_index.contains_key(digest))
    }

    async fn find_by_id(&self, id: NagId) -> NagResult<Option<Nag>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.nags.get(&id).cloned())
    }

    async fn find_by_digest(&self, digest: &TokenDigest) -> NagResult<Option<Nag>> {
        let state = self.state.read().map_err(lock_error)?;
        let nag = state
            .digest_index
            .get(digest)
            .and_then(|id| state.nags.get(id))
            .cloned();
        Ok(nag)
    }

    async fn nags_for_member(&self, member: MemberId) -> NagResult<Vec<Nag>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .nags
            .values()
            .filter(|nag| nag.who() == member)
            .cloned()
            .collect())
    }
}

/// A notifier that records outbound emails instead of delivering them.
///
/// Useful in tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<OutboundEmail>>>,
}

impl RecordingNotifier {
    /// Creates a notifier with an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything sent so far.
    ///
    /// Returns an empty list when the outbox lock is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent
            .read()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifierError> {
        let mut outbox = self
            .sent
            .write()
            .map_err(|err| NotifierError(err.to_string()))?;
        outbox.push(email.clone());
        Ok(())
    }
}
