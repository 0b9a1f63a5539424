//! Concrete task instances.

use super::{RecurringTaskTemplate, SchedulingDomainError, TaskDescriptor, TaskId, TemplateId};
use crate::directory::domain::MemberId;
use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete occurrence of work.
///
/// Descriptive fields are copied from the template at creation time and
/// are not re-synced when the template is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    descriptor: TaskDescriptor,
    creation_date: NaiveDate,
    scheduled_date: Option<NaiveDate>,
    deadline: Option<NaiveDate>,
    work_done: bool,
    work_accepted: Option<bool>,
    template: Option<TemplateId>,
}

impl Task {
    /// Creates a task by hand, unlinked to any template.
    #[must_use]
    pub fn manual(descriptor: TaskDescriptor, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            descriptor,
            creation_date: clock.utc().date_naive(),
            scheduled_date: None,
            deadline: None,
            work_done: false,
            work_accepted: None,
            template: None,
        }
    }

    /// Materializes one occurrence of a template on `scheduled_date`,
    /// copying the template's descriptive fields.
    #[must_use]
    pub fn from_template(
        template: &RecurringTaskTemplate,
        scheduled_date: NaiveDate,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskId::new(),
            descriptor: template.descriptor().clone(),
            creation_date: clock.utc().date_naive(),
            scheduled_date: Some(scheduled_date),
            deadline: None,
            work_done: false,
            work_accepted: None,
            template: Some(template.id()),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    /// Returns the date on which the task record was created, for
    /// tracking slippage.
    #[must_use]
    pub const fn creation_date(&self) -> NaiveDate {
        self.creation_date
    }

    /// Returns the date on which the task must be performed, if any.
    #[must_use]
    pub const fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_date
    }

    /// Returns the completion deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    /// Returns whether the worker has declared the work completely done.
    #[must_use]
    pub const fn work_done(&self) -> bool {
        self.work_done
    }

    /// Returns the reviewer's verdict; `None` until reviewed or when no
    /// reviewer is assigned.
    #[must_use]
    pub const fn work_accepted(&self) -> Option<bool> {
        self.work_accepted
    }

    /// Returns the originating template, if any.
    #[must_use]
    pub const fn template(&self) -> Option<TemplateId> {
        self.template
    }

    /// Sets a date on which the task must be performed.
    #[must_use]
    pub const fn scheduled_on(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    /// Sets a deadline by which the task must be completed.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Declares the work completely done.
    pub const fn mark_work_done(&mut self) {
        self.work_done = true;
    }

    /// Records the reviewer's verdict.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::ReviewBeforeCompletion`] when the
    /// work has not been marked done.
    pub const fn review(&mut self, accepted: bool) -> Result<(), SchedulingDomainError> {
        if !self.work_done {
            return Err(SchedulingDomainError::ReviewBeforeCompletion);
        }
        self.work_accepted = Some(accepted);
        Ok(())
    }

    /// Ensures `member` appears in the eligible-claimant list.
    ///
    /// Returns `true` when the member was newly added.
    pub fn ensure_eligible_claimant(&mut self, member: MemberId) -> bool {
        self.descriptor.eligible_claimants.insert(member)
    }

    /// Returns whether the claimant should receive credit for the task:
    /// work is done and either no reviewer is assigned or the reviewer
    /// accepted it.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        if self.descriptor.reviewer.is_none() {
            self.work_done
        } else {
            self.work_done && self.work_accepted == Some(true)
        }
    }

    /// Returns whether the task isn't yet completed, or a reviewer hasn't
    /// yet accepted it.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// Checks cross-field invariants that gate saving the task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::UnscheduledTemplateInstance`] when
    /// the task is template-linked without a scheduled date, or
    /// [`SchedulingDomainError::ReviewBeforeCompletion`] when a review
    /// verdict precedes completion.
    pub fn validate(&self) -> Result<(), SchedulingDomainError> {
        if self.work_accepted == Some(true) && !self.work_done {
            return Err(SchedulingDomainError::ReviewBeforeCompletion);
        }
        if self.template.is_some() && self.scheduled_date.is_none() {
            return Err(SchedulingDomainError::UnscheduledTemplateInstance);
        }
        self.descriptor.validate()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.deadline {
            None => write!(f, "{}", self.descriptor.short_desc),
            Some(deadline) => {
                write!(f, "{} [{} deadline]", self.descriptor.short_desc, deadline)
            }
        }
    }
}
