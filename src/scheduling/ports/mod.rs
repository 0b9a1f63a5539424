//! Port contracts for templates and task instances.

mod repository;

pub use repository::{
    SchedulingRepositoryError, SchedulingResult, TaskRepository, TemplateRepository,
};
