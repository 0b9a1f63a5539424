//! Adapter implementations for nag persistence and notification.

pub mod memory;

pub use memory::{InMemoryNagRepository, RecordingNotifier};
