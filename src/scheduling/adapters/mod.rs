//! Adapter implementations for scheduling persistence.

pub mod memory;

pub use memory::{InMemoryTaskRepository, InMemoryTemplateRepository};
