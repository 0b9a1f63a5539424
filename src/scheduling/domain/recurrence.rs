//! Recurrence definitions and pure date matching.
//!
//! Two mutually exclusive modes define a schedule for recurring tasks:
//!
//! 1. A day-of-week vs nth-of-month matrix for schedules like "every first
//!    and third Thursday".
//! 2. A repeat interval in days for schedules like "every 90 days".
//!
//! Raw flag combinations arrive as a [`RecurrenceSpec`] and are validated
//! into a [`Recurrence`], rejecting conflicting modes at construction time.

use super::SchedulingDomainError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder glyph for unselected weekdays in the compact recurrence
/// string.
const BLANK_DAY: char = '\u{25CC}';

/// Day-of-week selection flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySet {
    /// Recurs on Monday.
    pub monday: bool,
    /// Recurs on Tuesday.
    pub tuesday: bool,
    /// Recurs on Wednesday.
    pub wednesday: bool,
    /// Recurs on Thursday.
    pub thursday: bool,
    /// Recurs on Friday.
    pub friday: bool,
    /// Recurs on Saturday.
    pub saturday: bool,
    /// Recurs on Sunday.
    pub sunday: bool,
}

impl WeekdaySet {
    /// Returns whether any weekday is selected.
    #[must_use]
    pub const fn any(self) -> bool {
        self.monday
            || self.tuesday
            || self.wednesday
            || self.thursday
            || self.friday
            || self.saturday
            || self.sunday
    }

    /// Returns whether the given weekday is selected.
    #[must_use]
    pub const fn contains(self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

/// Ordinal-in-month selection flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalSet {
    /// Recurs on the first selected weekday in the month.
    pub first: bool,
    /// Recurs on the second selected weekday in the month.
    pub second: bool,
    /// Recurs on the third selected weekday in the month.
    pub third: bool,
    /// Recurs on the fourth selected weekday in the month.
    pub fourth: bool,
    /// Recurs on the last selected weekday in the month, which is the 4th
    /// or 5th depending on the calendar.
    pub last: bool,
    /// Recurs every week.
    pub every: bool,
}

impl OrdinalSet {
    /// Returns whether any ordinal is selected.
    #[must_use]
    pub const fn any(self) -> bool {
        self.first || self.second || self.third || self.fourth || self.last || self.every
    }

    /// Returns whether an ordinal other than `every` is selected.
    #[must_use]
    pub const fn any_specific(self) -> bool {
        self.first || self.second || self.third || self.fourth || self.last
    }
}

/// Whether interval-mode occurrences are pinned to exact dates.
///
/// `No` means the task must occur on specific regularly-spaced dates;
/// `Yes` means it is like an oil change that should happen every 90 days
/// but not on any specific date; `NotApplicable` is the value for
/// templates that do not repeat at intervals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexibleDates {
    /// Occurrences may slip to nearby dates.
    Yes,
    /// Occurrences are pinned to exact dates.
    No,
    /// The template does not repeat at intervals.
    #[default]
    NotApplicable,
}

/// Raw recurrence flags as entered by an administrator.
///
/// Validate into a [`Recurrence`] before use; the raw form can express
/// contradictory combinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceSpec {
    /// Day-of-week flags for certain-days mode.
    pub weekdays: WeekdaySet,
    /// Ordinal-in-month flags for certain-days mode.
    pub ordinals: OrdinalSet,
    /// Minimum number of days between recurrences, e.g. 14 for every two
    /// weeks.
    pub repeat_days: Option<u16>,
    /// Date-flexibility of interval-mode occurrences.
    pub flexible_dates: FlexibleDates,
}

impl RecurrenceSpec {
    /// Returns whether the certain-days fields are populated.
    #[must_use]
    pub const fn repeats_on_certain_days(self) -> bool {
        self.weekdays.any() && self.ordinals.any()
    }

    /// Returns whether the interval fields are populated.
    #[must_use]
    pub const fn repeats_at_intervals(self) -> bool {
        self.repeat_days.is_some() && !matches!(self.flexible_dates, FlexibleDates::NotApplicable)
    }

    /// Validates the flags into a [`Recurrence`].
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError`] when neither or both modes are
    /// populated, when `every` is combined with an ordinal flag, when
    /// `fourth` and `last` are both set, or when the repeat interval is
    /// zero.
    pub fn validate(self) -> Result<Recurrence, SchedulingDomainError> {
        match (self.repeats_on_certain_days(), self.repeats_at_intervals()) {
            (true, true) => Err(SchedulingDomainError::ConflictingRecurrenceModes),
            (false, false) => Err(SchedulingDomainError::NoRecurrenceMode),
            (true, false) => self.validate_certain_days(),
            (false, true) => self.validate_interval(),
        }
    }

    fn validate_certain_days(self) -> Result<Recurrence, SchedulingDomainError> {
        if self.ordinals.every && self.ordinals.any_specific() {
            return Err(SchedulingDomainError::EveryExcludesOrdinals);
        }
        if self.ordinals.fourth && self.ordinals.last {
            return Err(SchedulingDomainError::FourthExcludesLast);
        }
        Ok(Recurrence::CertainDays {
            weekdays: self.weekdays,
            ordinals: self.ordinals,
        })
    }

    fn validate_interval(self) -> Result<Recurrence, SchedulingDomainError> {
        let repeat_days = self
            .repeat_days
            .ok_or(SchedulingDomainError::NoRecurrenceMode)?;
        if repeat_days == 0 {
            return Err(SchedulingDomainError::NonPositiveRepeatInterval);
        }
        Ok(Recurrence::Interval {
            repeat_days,
            flexible_dates: matches!(self.flexible_dates, FlexibleDates::Yes),
        })
    }
}

/// A validated recurrence definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Recurrence {
    /// Day-of-week vs nth-of-month matrix.
    CertainDays {
        /// Selected weekdays.
        weekdays: WeekdaySet,
        /// Selected ordinals.
        ordinals: OrdinalSet,
    },
    /// Fixed number of days between occurrences.
    Interval {
        /// Days between occurrences.
        repeat_days: u16,
        /// Whether occurrences may slip to nearby dates.
        flexible_dates: bool,
    },
}

impl Recurrence {
    /// Returns whether `candidate` matches this recurrence.
    ///
    /// `last_scheduled` is the greatest scheduled date among the
    /// template's existing instances; when none exist the caller
    /// substitutes the day before the template's start date, so the first
    /// candidate exactly one interval after that day can match starting
    /// from the start date itself.
    #[must_use]
    pub fn matches(self, candidate: NaiveDate, last_scheduled: NaiveDate) -> bool {
        match self {
            Self::Interval { repeat_days, .. } => {
                let days_since = (candidate - last_scheduled).num_days();
                days_since == i64::from(repeat_days)
            }
            Self::CertainDays { weekdays, ordinals } => {
                matches_certain_days(candidate, weekdays, ordinals)
            }
        }
    }
}

fn matches_certain_days(candidate: NaiveDate, weekdays: WeekdaySet, ordinals: OrdinalSet) -> bool {
    if !weekdays.contains(candidate.weekday()) {
        return false;
    }
    if ordinals.every {
        return true;
    }
    if ordinals.last && is_last_in_month(candidate) {
        return true;
    }
    match nth_in_month(candidate) {
        1 => ordinals.first,
        2 => ordinals.second,
        3 => ordinals.third,
        // Months with a 4th-but-no-5th occurrence treat "fourth" as
        // equivalent to "last".
        4 => ordinals.fourth || ordinals.last,
        _ => false,
    }
}

/// Returns which occurrence of its weekday `date` is within its month,
/// 1-based.
fn nth_in_month(date: NaiveDate) -> u8 {
    let mut dom = date.day();
    let mut ordinal = 1_u8;
    while dom > 7 {
        dom -= 7;
        ordinal = ordinal.saturating_add(1);
    }
    ordinal
}

/// Returns whether adding one day to `date` rolls into the next month.
fn is_last_in_month(date: NaiveDate) -> bool {
    date.checked_add_days(Days::new(1))
        .is_none_or(|next| next.month() != date.month())
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CertainDays { weekdays, .. } => {
                let days = [
                    (weekdays.monday, 'M'),
                    (weekdays.tuesday, 'T'),
                    (weekdays.wednesday, 'W'),
                    (weekdays.thursday, 'T'),
                    (weekdays.friday, 'F'),
                    (weekdays.saturday, 'S'),
                    (weekdays.sunday, 'S'),
                ];
                for (selected, glyph) in days {
                    write!(f, "{}", if selected { glyph } else { BLANK_DAY })?;
                }
                Ok(())
            }
            Self::Interval { repeat_days: 1, .. } => write!(f, "every day"),
            Self::Interval { repeat_days, .. } => write!(f, "every {repeat_days} days"),
        }
    }
}
