//! Domain model for claims and logged work.

mod claim;
mod error;
mod ids;
mod work;

pub use claim::{Claim, ClaimStatus};
pub use error::ClaimDomainError;
pub use ids::{ClaimId, WorkId};
pub use work::Work;
