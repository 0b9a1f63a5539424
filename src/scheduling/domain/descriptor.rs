//! The descriptive fields shared between templates and task instances.

use super::{SchedulingDomainError, WorkDuration};
use crate::directory::domain::{MemberId, TagId};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scheduling priority of a task, used by the panic escalation rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can slip without consequence.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// Must be staffed; triggers panic escalation when scheduled today.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Fields common to [`RecurringTaskTemplate`] and [`Task`].
///
/// When a task is generated from a template these fields are copied from
/// the template to the task, once; later template edits do not propagate.
///
/// [`RecurringTaskTemplate`]: super::RecurringTaskTemplate
/// [`Task`]: super::Task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// The member that asked for the task to exist or owns its content.
    /// Almost certainly not the person who will claim it and do the work.
    pub owner: Option<MemberId>,
    /// A short description/name for the task.
    pub short_desc: String,
    /// Instructions for completing the task.
    pub instructions: String,
    /// A member who will review the work once it is completed, if required.
    pub reviewer: Option<MemberId>,
    /// The maximum number of members that can simultaneously claim/work
    /// the task, often 1.
    pub max_claimants: u32,
    /// An estimate of the work required. This is work time, not elapsed
    /// time. Absent means "not yet estimated".
    pub work_estimate: Option<WorkDuration>,
    /// Members individually chosen as eligible to claim the task.
    pub eligible_claimants: BTreeSet<MemberId>,
    /// Anybody holding one of these tags is eligible to claim the task.
    pub eligible_tags: BTreeSet<TagId>,
    /// Members that are not interested in this item.
    pub uninterested: BTreeSet<MemberId>,
    /// The time at which the task should begin, if any.
    pub start_time: Option<NaiveTime>,
    /// The time at which the task should end, if any.
    pub end_time: Option<NaiveTime>,
    /// Scheduling priority.
    pub priority: Priority,
    /// Whether the reminder planner may solicit workers for this task.
    pub should_nag: bool,
}

impl TaskDescriptor {
    /// Creates a descriptor with the given short description and defaults
    /// for everything else: one claimant, medium priority, reminders on.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::EmptyShortDesc`] when the short
    /// description is empty after trimming.
    pub fn new(short_desc: impl Into<String>) -> Result<Self, SchedulingDomainError> {
        let normalized = short_desc.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(SchedulingDomainError::EmptyShortDesc);
        }
        Ok(Self {
            owner: None,
            short_desc: normalized,
            instructions: String::new(),
            reviewer: None,
            max_claimants: 1,
            work_estimate: None,
            eligible_claimants: BTreeSet::new(),
            eligible_tags: BTreeSet::new(),
            uninterested: BTreeSet::new(),
            start_time: None,
            end_time: None,
            priority: Priority::default(),
            should_nag: true,
        })
    }

    /// Sets the instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: MemberId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the reviewer.
    #[must_use]
    pub fn with_reviewer(mut self, reviewer: MemberId) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Sets the work estimate.
    #[must_use]
    pub const fn with_work_estimate(mut self, estimate: WorkDuration) -> Self {
        self.work_estimate = Some(estimate);
        self
    }

    /// Sets the claimant cap.
    #[must_use]
    pub const fn with_max_claimants(mut self, max_claimants: u32) -> Self {
        self.max_claimants = max_claimants;
        self
    }

    /// Adds individually eligible claimants.
    #[must_use]
    pub fn with_eligible_claimants(
        mut self,
        members: impl IntoIterator<Item = MemberId>,
    ) -> Self {
        self.eligible_claimants.extend(members);
        self
    }

    /// Adds eligible tags.
    #[must_use]
    pub fn with_eligible_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.eligible_tags.extend(tags);
        self
    }

    /// Adds uninterested members.
    #[must_use]
    pub fn with_uninterested(mut self, members: impl IntoIterator<Item = MemberId>) -> Self {
        self.uninterested.extend(members);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Disables worker solicitation for this task.
    #[must_use]
    pub const fn without_nagging(mut self) -> Self {
        self.should_nag = false;
        self
    }

    /// Sets the start and end time of day.
    #[must_use]
    pub const fn with_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Checks invariants that gate saving a template or task.
    ///
    /// A non-positive work estimate cannot occur here: [`WorkDuration`]
    /// rejects it at construction.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::NoEligiblePool`] when neither
    /// eligible claimants nor eligible tags are populated.
    pub fn validate(&self) -> Result<(), SchedulingDomainError> {
        if self.eligible_claimants.is_empty() && self.eligible_tags.is_empty() {
            return Err(SchedulingDomainError::NoEligiblePool);
        }
        Ok(())
    }
}
