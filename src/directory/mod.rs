//! Member directory for Corvee.
//!
//! Holds the membership roster, the tag vocabulary, and the taggings that
//! link the two, together with each member's worker profile (nag
//! preferences). Eligibility computation in the claim module reads tag
//! membership through this module's repository port at evaluation time; no
//! caching happens here. The module follows hexagonal architecture:
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
