//! Port contracts for claim and work persistence.

mod repository;

pub use repository::{ClaimRepository, ClaimRepositoryError, ClaimResult, WorkRepository};
