//! Recurring task generation for Corvee.
//!
//! This module turns recurrence definitions into concrete, dated task
//! instances: the shared task descriptor copied from template to instance,
//! the two mutually exclusive recurrence modes and their date-matching
//! rules, and the idempotent instance generator that is safe to re-run on a
//! schedule with an overlapping horizon. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
