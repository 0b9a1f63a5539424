//! Claim and work ledger for Corvee.
//!
//! Governs the claim state machine per task (creation, expiry,
//! verification, default-claimant abandonment), appends work records, and
//! computes eligibility sets over member populations. The module follows
//! hexagonal architecture:
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
