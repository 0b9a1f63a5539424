//! Domain model for the member directory.
//!
//! Members, tags, and taggings are kept free of infrastructure concerns;
//! uniqueness of (member, tag) pairs and tag names is guaranteed by the
//! repository port.

mod error;
mod ids;
mod member;
mod tag;

pub use error::DirectoryDomainError;
pub use ids::{MemberId, TagId, TaggingId};
pub use member::{EmailAddress, Member, WorkerProfile};
pub use tag::{Tag, Tagging};
