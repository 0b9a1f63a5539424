//! Repository ports for template and task persistence.

use crate::scheduling::domain::{RecurringTaskTemplate, Task, TaskId, TemplateId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for scheduling repository operations.
pub type SchedulingResult<T> = Result<T, SchedulingRepositoryError>;

/// Template persistence contract.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Stores a new template.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::DuplicateTemplate`] when the
    /// template ID already exists.
    async fn store(&self, template: &RecurringTaskTemplate) -> SchedulingResult<()>;

    /// Persists changes to an existing template.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::TemplateNotFound`] when the
    /// template does not exist.
    async fn update(&self, template: &RecurringTaskTemplate) -> SchedulingResult<()>;

    /// Finds a template by identifier.
    ///
    /// Returns `None` when the template does not exist.
    async fn find_by_id(&self, id: TemplateId)
    -> SchedulingResult<Option<RecurringTaskTemplate>>;

    /// Returns all templates with the active flag set.
    async fn active_templates(&self) -> SchedulingResult<Vec<RecurringTaskTemplate>>;
}

/// Task persistence contract.
///
/// The (template, scheduled date) uniqueness constraint is the ultimate
/// idempotency guarantee for instance generation; existence checks are a
/// fast path only.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::DuplicateTask`] when the task
    /// ID already exists, or
    /// [`SchedulingRepositoryError::DuplicateInstance`] when another task
    /// already occupies the same (template, scheduled date) slot.
    async fn store(&self, task: &Task) -> SchedulingResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::TaskNotFound`] when the task
    /// does not exist.
    async fn update(&self, task: &Task) -> SchedulingResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> SchedulingResult<Option<Task>>;

    /// Returns all instances generated from the given template.
    async fn tasks_for_template(&self, template: TemplateId) -> SchedulingResult<Vec<Task>>;

    /// Returns whether an instance of `template` exists on `date`.
    async fn exists_for_template_on(
        &self,
        template: TemplateId,
        date: NaiveDate,
    ) -> SchedulingResult<bool>;

    /// Returns the greatest scheduled date among the template's
    /// instances, or `None` when it has none.
    async fn greatest_scheduled_date(
        &self,
        template: TemplateId,
    ) -> SchedulingResult<Option<NaiveDate>>;

    /// Returns tasks scheduled in `[from, to]`, both ends inclusive.
    async fn scheduled_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SchedulingResult<Vec<Task>>;
}

/// Errors returned by scheduling repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SchedulingRepositoryError {
    /// A template with the same identifier already exists.
    #[error("duplicate template identifier: {0}")]
    DuplicateTemplate(TemplateId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A task already occupies the (template, scheduled date) slot.
    #[error("instance of template {template} already exists on {date}")]
    DuplicateInstance {
        /// The template whose slot is occupied.
        template: TemplateId,
        /// The occupied date.
        date: NaiveDate,
    },

    /// The template was not found.
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SchedulingRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
