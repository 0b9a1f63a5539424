//! Recurring task template aggregate.

use super::{Recurrence, RecurrenceSpec, SchedulingDomainError, TaskDescriptor, TemplateId};
use crate::directory::domain::MemberId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reusable definition from which dated task instances are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTaskTemplate {
    id: TemplateId,
    descriptor: TaskDescriptor,
    default_claimant: Option<MemberId>,
    start_date: NaiveDate,
    active: bool,
    recurrence: Recurrence,
}

impl RecurringTaskTemplate {
    /// Creates an active template, validating the descriptor and the
    /// recurrence flags.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError`] when the descriptor fails
    /// validation or the recurrence flags are contradictory.
    pub fn new(
        descriptor: TaskDescriptor,
        start_date: NaiveDate,
        spec: RecurrenceSpec,
    ) -> Result<Self, SchedulingDomainError> {
        descriptor.validate()?;
        let recurrence = spec.validate()?;
        Ok(Self {
            id: TemplateId::new(),
            descriptor,
            default_claimant: None,
            start_date,
            active: true,
            recurrence,
        })
    }

    /// Designates the member presumed to take each generated instance
    /// unless they decline.
    #[must_use]
    pub const fn with_default_claimant(mut self, member: MemberId) -> Self {
        self.default_claimant = Some(member);
        self
    }

    /// Returns the template identifier.
    #[must_use]
    pub const fn id(&self) -> TemplateId {
        self.id
    }

    /// Returns the descriptive fields copied to generated instances.
    #[must_use]
    pub const fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    /// Returns the designated default claimant, if any.
    #[must_use]
    pub const fn default_claimant(&self) -> Option<MemberId> {
        self.default_claimant
    }

    /// Returns the date of the first possible instance.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns whether instance generation is enabled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the validated recurrence definition.
    #[must_use]
    pub const fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    /// Enables or disables future instance generation. Deactivation never
    /// touches instances that already exist.
    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Replaces the recurrence definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError`] when the new flags are
    /// contradictory.
    pub fn set_recurrence(&mut self, spec: RecurrenceSpec) -> Result<(), SchedulingDomainError> {
        self.recurrence = spec.validate()?;
        Ok(())
    }

    /// The stand-in for "greatest scheduled date" when no instances exist
    /// yet: the day before the start date, so the first candidate exactly
    /// one interval later can match starting from the start date.
    #[must_use]
    pub fn fallback_last_scheduled(&self) -> NaiveDate {
        self.start_date.pred_opt().unwrap_or(NaiveDate::MIN)
    }

    /// Returns whether `candidate` matches this template's recurrence,
    /// given the greatest scheduled date among its existing instances.
    #[must_use]
    pub fn date_matches(&self, candidate: NaiveDate, last_scheduled: NaiveDate) -> bool {
        self.recurrence.matches(candidate, last_scheduled)
    }
}

impl fmt::Display for RecurringTaskTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.descriptor.short_desc, self.recurrence)
    }
}
