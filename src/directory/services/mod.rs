//! Orchestration services for the member directory.

mod tagging;

pub use tagging::{TaggingService, TaggingServiceError, TaggingServiceResult};
