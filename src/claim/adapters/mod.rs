//! Adapter implementations for claim and work persistence.

pub mod memory;

pub use memory::{InMemoryClaimRepository, InMemoryWorkRepository};
