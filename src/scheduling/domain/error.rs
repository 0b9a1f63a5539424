//! Error types for scheduling domain validation.

use thiserror::Error;

/// Errors returned while constructing or mutating scheduling domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulingDomainError {
    /// Both recurrence modes are populated.
    #[error("choose day-of-week recurrence or a repeat interval, not both")]
    ConflictingRecurrenceModes,

    /// Neither recurrence mode is populated.
    #[error("a recurrence requires weekday/ordinal flags or a repeat interval")]
    NoRecurrenceMode,

    /// The `every` flag is combined with an ordinal flag.
    #[error("if tasks recur every week, don't choose any other weeks")]
    EveryExcludesOrdinals,

    /// Both `fourth` and `last` ordinal flags are set.
    #[error("choose either fourth week or last week, not both")]
    FourthExcludesLast,

    /// The repeat interval is zero.
    #[error("repeat interval must be at least one day")]
    NonPositiveRepeatInterval,

    /// The short description is empty after trimming.
    #[error("a task needs a short description")]
    EmptyShortDesc,

    /// Neither eligible claimants nor eligible tags are populated.
    #[error("one or more people and/or one or more tags must be selected")]
    NoEligiblePool,

    /// A template-linked task has no scheduled date.
    #[error("a task generated from a template must have a scheduled date")]
    UnscheduledTemplateInstance,

    /// Work was reviewed before being marked complete.
    #[error("work cannot be reviewed before it is marked as completed")]
    ReviewBeforeCompletion,
}
