//! Orchestration services for the claim ledger.

mod eligibility;
mod ledger;

pub use eligibility::{EligibilityError, EligibilityResult, EligibilityService};
pub use ledger::{ClaimLedger, ClaimLedgerError, ClaimLedgerResult, ClaimRequest};
