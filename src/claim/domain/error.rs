//! Error types for claim domain validation.

use super::ClaimStatus;
use thiserror::Error;

/// Errors returned while mutating claim domain values.
///
/// Non-positive durations cannot occur in this module: quantities of work
/// time are validated at construction by
/// [`WorkDuration`](crate::scheduling::domain::WorkDuration).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimDomainError {
    /// The requested status transition is not part of the state machine.
    #[error("cannot transition claim from {from:?} to {to:?}")]
    InvalidStatusTransition {
        /// Status the claim currently holds.
        from: ClaimStatus,
        /// Status that was requested.
        to: ClaimStatus,
    },
}
