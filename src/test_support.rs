//! Shared helpers for deterministic tests.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use mockable::Clock;

/// A clock frozen at noon UTC on a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Creates a clock frozen on the given calendar day.
    ///
    /// # Panics
    ///
    /// Panics when the date is invalid; test dates are literals.
    #[must_use]
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self(NaiveDate::from_ymd_opt(year, month, day).expect("valid test date"))
    }

    /// Returns the frozen date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).expect("valid time");
        self.0.and_time(noon).and_utc()
    }
}
