//! Records of outbound reminders.

use super::TokenDigest;
use crate::claim::domain::ClaimId;
use crate::directory::domain::MemberId;
use crate::scheduling::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a nag record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NagId(Uuid);

impl NagId {
    /// Creates a new random nag identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for NagId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record of one outbound reminder.
///
/// Stores only the token digest, never the raw token. Nags are never
/// updated and never expire automatically; consumption-time expiry is a
/// concern of the surface that redeems the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nag {
    id: NagId,
    who: MemberId,
    token_digest: TokenDigest,
    when: DateTime<Utc>,
    tasks: Vec<TaskId>,
    claims: Vec<ClaimId>,
}

impl Nag {
    /// Creates a nag record stamped with the clock's current time.
    #[must_use]
    pub fn new(who: MemberId, token_digest: TokenDigest, clock: &impl Clock) -> Self {
        Self {
            id: NagId::new(),
            who,
            token_digest,
            when: clock.utc(),
            tasks: Vec::new(),
            claims: Vec::new(),
        }
    }

    /// Associates the tasks the reminder is about.
    #[must_use]
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = TaskId>) -> Self {
        self.tasks = tasks.into_iter().collect();
        self
    }

    /// Associates the claims the reminder is about.
    #[must_use]
    pub fn with_claims(mut self, claims: impl IntoIterator<Item = ClaimId>) -> Self {
        self.claims = claims.into_iter().collect();
        self
    }

    /// Returns the nag identifier.
    #[must_use]
    pub const fn id(&self) -> NagId {
        self.id
    }

    /// Returns the reminded member.
    #[must_use]
    pub const fn who(&self) -> MemberId {
        self.who
    }

    /// Returns the stored token digest.
    #[must_use]
    pub const fn token_digest(&self) -> &TokenDigest {
        &self.token_digest
    }

    /// Returns when the reminder was recorded.
    #[must_use]
    pub const fn when(&self) -> DateTime<Utc> {
        self.when
    }

    /// Returns the associated tasks.
    #[must_use]
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// Returns the associated claims.
    #[must_use]
    pub fn claims(&self) -> &[ClaimId] {
        &self.claims
    }
}
