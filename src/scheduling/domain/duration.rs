//! Validated work-time quantity.

use chrono::Duration;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Error returned when a work duration is zero or negative.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("work duration must be positive")]
pub struct InvalidWorkDuration;

/// A positive quantity of work time, stored with second precision.
///
/// This is work time, not elapsed time: estimates, claimed commitments,
/// and logged work all use this scalar, so they can be summed against each
/// other without unit conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkDuration(Duration);

impl WorkDuration {
    /// Creates a validated work duration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWorkDuration`] when the duration is not positive.
    pub fn new(duration: Duration) -> Result<Self, InvalidWorkDuration> {
        if duration <= Duration::zero() {
            return Err(InvalidWorkDuration);
        }
        Ok(Self(duration))
    }

    /// Creates a work duration from whole hours.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWorkDuration`] when `hours` is not positive.
    pub fn from_hours(hours: i64) -> Result<Self, InvalidWorkDuration> {
        Self::new(Duration::hours(hours))
    }

    /// Creates a work duration from whole minutes.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWorkDuration`] when `minutes` is not positive.
    pub fn from_minutes(minutes: i64) -> Result<Self, InvalidWorkDuration> {
        Self::new(Duration::minutes(minutes))
    }

    /// Returns the wrapped duration.
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        self.0
    }
}

impl fmt::Display for WorkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.0.num_minutes();
        write!(f, "{minutes}m")
    }
}

impl Serialize for WorkDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0.num_seconds())
    }
}

impl<'de> Deserialize<'de> for WorkDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Self::new(Duration::seconds(seconds)).map_err(D::Error::custom)
    }
}
