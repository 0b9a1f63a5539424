//! Claim records and their status machine.

use super::{ClaimDomainError, ClaimId};
use crate::directory::domain::MemberId;
use crate::scheduling::domain::{TaskId, WorkDuration};
use chrono::{NaiveDate, NaiveTime};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Claim lifecycle status.
///
/// The machine runs `Queued -> Current -> Expired`; abandonment deletes
/// the record outright instead of transitioning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// The member currently holds the task.
    Current,
    /// The claim lapsed without the work being performed.
    Expired,
    /// The member is waiting for a slot on a fully claimed task.
    Queued,
}

impl ClaimStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Expired => "expired",
            Self::Queued => "queued",
        }
    }
}

/// A member's stake on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    id: ClaimId,
    task: TaskId,
    member: MemberId,
    stake_date: NaiveDate,
    claimed_start_time: Option<NaiveTime>,
    claimed_duration: WorkDuration,
    status: ClaimStatus,
    date_verified: Option<NaiveDate>,
}

impl Claim {
    /// Creates a `Current` claim staked on the clock's current date.
    #[must_use]
    pub fn new(
        task: TaskId,
        member: MemberId,
        claimed_duration: WorkDuration,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ClaimId::new(),
            task,
            member,
            stake_date: clock.utc().date_naive(),
            claimed_start_time: None,
            claimed_duration,
            status: ClaimStatus::Current,
            date_verified: None,
        }
    }

    /// Sets the time of day at which the member intends to start.
    #[must_use]
    pub const fn with_start_time(mut self, start_time: NaiveTime) -> Self {
        self.claimed_start_time = Some(start_time);
        self
    }

    /// Queues the claim behind a fully claimed task instead of making it
    /// current.
    #[must_use]
    pub const fn queued(mut self) -> Self {
        self.status = ClaimStatus::Queued;
        self
    }

    /// Returns the claim identifier.
    #[must_use]
    pub const fn id(&self) -> ClaimId {
        self.id
    }

    /// Returns the claimed task.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the claiming member.
    #[must_use]
    pub const fn member(&self) -> MemberId {
        self.member
    }

    /// Returns the date the stake was made.
    #[must_use]
    pub const fn stake_date(&self) -> NaiveDate {
        self.stake_date
    }

    /// Returns the intended start time of day, if declared.
    #[must_use]
    pub const fn claimed_start_time(&self) -> Option<NaiveTime> {
        self.claimed_start_time
    }

    /// Returns the work time the member has committed to.
    #[must_use]
    pub const fn claimed_duration(&self) -> WorkDuration {
        self.claimed_duration
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ClaimStatus {
        self.status
    }

    /// Returns the date the member confirmed the claim, if any.
    #[must_use]
    pub const fn date_verified(&self) -> Option<NaiveDate> {
        self.date_verified
    }

    /// Returns whether the member has confirmed the claim.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.date_verified.is_some()
    }

    /// Records the member's explicit confirmation on the given date.
    pub const fn verify(&mut self, date: NaiveDate) {
        self.date_verified = Some(date);
    }

    /// Promotes a queued claim to current.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimDomainError::InvalidStatusTransition`] when the
    /// claim is not queued.
    pub const fn promote(&mut self) -> Result<(), ClaimDomainError> {
        if !matches!(self.status, ClaimStatus::Queued) {
            return Err(ClaimDomainError::InvalidStatusTransition {
                from: self.status,
                to: ClaimStatus::Current,
            });
        }
        self.status = ClaimStatus::Current;
        Ok(())
    }

    /// Expires a current claim.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimDomainError::InvalidStatusTransition`] when the
    /// claim is not current.
    pub const fn expire(&mut self) -> Result<(), ClaimDomainError> {
        if !matches!(self.status, ClaimStatus::Current) {
            return Err(ClaimDomainError::InvalidStatusTransition {
                from: self.status,
                to: ClaimStatus::Expired,
            });
        }
        self.status = ClaimStatus::Expired;
        Ok(())
    }
}
