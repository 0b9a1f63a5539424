//! In-memory template and task repositories.
//!
//! The task store enforces the (template, scheduled date) uniqueness
//! constraint inside its write lock, making concurrent generator runs for
//! the same template race-safe.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::scheduling::{
    domain::{RecurringTaskTemplate, Task, TaskId, TemplateId},
    ports::{SchedulingRepositoryError, SchedulingResult, TaskRepository, TemplateRepository},
};

fn lock_error(err: impl std::fmt::Display) -> SchedulingRepositoryError {
    SchedulingRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Thread-safe in-memory template repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateRepository {
    state: Arc<RwLock<HashMap<TemplateId, RecurringTaskTemplate>>>,
}

impl InMemoryTemplateRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn store(&self, template: &RecurringTaskTemplate) -> SchedulingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.contains_key(&template.id()) {
            return Err(SchedulingRepositoryError::DuplicateTemplate(template.id()));
        }
        state.insert(template.id(), template.clone());
        Ok(())
    }

    async fn update(&self, template: &RecurringTaskTemplate) -> SchedulingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.contains_key(&template.id()) {
            return Err(SchedulingRepositoryError::TemplateNotFound(template.id()));
        }
        state.insert(template.id(), template.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: TemplateId,
    ) -> SchedulingResult<Option<RecurringTaskTemplate>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.get(&id).cloned())
    }

    async fn active_templates(&self) -> SchedulingResult<Vec<RecurringTaskTemplate>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .values()
            .filter(|template| template.is_active())
            .cloned()
            .collect())
    }
}

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    instance_index: HashMap<(TemplateId, NaiveDate), TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn instance_key(task: &Task) -> Option<(TemplateId, NaiveDate)> {
    match (task.template(), task.scheduled_date()) {
        (Some(template), Some(date)) => Some((template, date)),
        _ => None,
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> SchedulingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(SchedulingRepositoryError::DuplicateTask(task.id()));
        }
        if let Some(key) = instance_key(task) {
            if state.instance_index.contains_key(&key) {
                return Err(SchedulingRepositoryError::DuplicateInstance {
                    template: key.0,
                    date: key.1,
                });
            }
            state.instance_index.insert(key, task.id());
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> SchedulingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let old_task = state
            .tasks
            .get(&task.id())
            .ok_or(SchedulingRepositoryError::TaskNotFound(task.id()))?
            .clone();

        if let Some(old_key) = instance_key(&old_task) {
            state.instance_index.remove(&old_key);
        }
        if let Some(key) = instance_key(task) {
            state.instance_index.insert(key, task.id());
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> SchedulingResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn tasks_for_template(&self, template: TemplateId) -> SchedulingResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.template() == Some(template))
            .cloned()
            .collect())
    }

    async fn exists_for_template_on(
        &self,
        template: TemplateId,
        date: NaiveDate,
    ) -> SchedulingResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.instance_index.contains_key(&(template, date)))
    }

    async fn greatest_scheduled_date(
        &self,
        template: TemplateId,
    ) -> SchedulingResult<Option<NaiveDate>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.template() == Some(template))
            .filter_map(Task::scheduled_date)
            .max())
    }

    async fn scheduled_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SchedulingResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| {
                task.scheduled_date()
                    .is_some_and(|date| date >= from && date <= to)
            })
            .cloned()
            .collect())
    }
}
