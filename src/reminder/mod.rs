//! Reminder planning for Corvee.
//!
//! Decides, on a rolling basis, whom to remind about unclaimed or
//! unverified work: the three ordered reminder passes (abandon stale
//! default claims, verify near-term default claims, nag for workers), the
//! nag records with their single-use auth tokens, and the new-taggings
//! report. Outbound delivery goes through the [`ports::Notifier`] port;
//! transport is external. The module follows hexagonal architecture:
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
