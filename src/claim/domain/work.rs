//! Append-only work records.

use super::{ClaimId, WorkId};
use crate::directory::domain::MemberId;
use crate::scheduling::domain::{TaskId, WorkDuration};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A logged contribution of work toward completing a task.
///
/// Work records are never mutated after creation; they are only summed
/// for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    id: WorkId,
    worker: MemberId,
    task: TaskId,
    claim: Option<ClaimId>,
    duration: WorkDuration,
    work_date: NaiveDate,
}

impl Work {
    /// Creates a work record.
    #[must_use]
    pub fn new(
        worker: MemberId,
        task: TaskId,
        claim: Option<ClaimId>,
        duration: WorkDuration,
        work_date: NaiveDate,
    ) -> Self {
        Self {
            id: WorkId::new(),
            worker,
            task,
            claim,
            duration,
            work_date,
        }
    }

    /// Returns the work record identifier.
    #[must_use]
    pub const fn id(&self) -> WorkId {
        self.id
    }

    /// Returns the member that did the work.
    #[must_use]
    pub const fn worker(&self) -> MemberId {
        self.worker
    }

    /// Returns the task that was worked.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the claim the work was logged against, if any.
    #[must_use]
    pub const fn claim(&self) -> Option<ClaimId> {
        self.claim
    }

    /// Returns the actual time worked. This is work time, not elapsed
    /// time.
    #[must_use]
    pub const fn duration(&self) -> WorkDuration {
        self.duration
    }

    /// Returns the date on which the work was done.
    #[must_use]
    pub const fn work_date(&self) -> NaiveDate {
        self.work_date
    }
}
