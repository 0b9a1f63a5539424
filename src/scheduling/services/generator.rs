//! Idempotent materialization of task instances from templates.
//!
//! The generator is designed to run on a schedule (e.g. daily) with an
//! overlapping look-ahead horizon: repeated invocations over overlapping
//! windows never produce duplicate instances. The existence check before
//! creation is a fast path; the repository's (template, scheduled date)
//! uniqueness constraint is the race-safe backstop, so a duplicate-instance
//! rejection from a concurrent run is treated as "already materialized" and
//! skipped.

use crate::scheduling::{
    domain::{RecurringTaskTemplate, Task, TemplateId},
    ports::{SchedulingRepositoryError, TaskRepository, TemplateRepository},
};
use chrono::{Days, NaiveDate};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Generator configuration supplied by the external scheduler.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeneratorConfig {
    /// How many days past "today" to materialize instances for.
    pub horizon_days: u16,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { horizon_days: 28 }
    }
}

/// Outcome of one generation run for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// The template that was walked.
    pub template: TemplateId,
    /// Scheduled dates of the instances created by this run.
    pub created: Vec<NaiveDate>,
}

/// Service-level errors for instance generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] SchedulingRepositoryError),
}

/// Result type for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Walks a date range and materializes task instances from templates.
#[derive(Clone)]
pub struct InstanceGenerator<TR, KR, C>
where
    TR: TemplateRepository,
    KR: TaskRepository,
    C: Clock + Send + Sync,
{
    templates: Arc<TR>,
    tasks: Arc<KR>,
    clock: Arc<C>,
    config: GeneratorConfig,
}

impl<TR, KR, C> InstanceGenerator<TR, KR, C>
where
    TR: TemplateRepository,
    KR: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new instance generator.
    #[must_use]
    pub const fn new(
        templates: Arc<TR>,
        tasks: Arc<KR>,
        clock: Arc<C>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            templates,
            tasks,
            clock,
            config,
        }
    }

    /// Generates instances for every active template.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Repository`] when a lookup or store
    /// fails.
    pub async fn generate_all(&self) -> GeneratorResult<Vec<GenerationReport>> {
        let templates = self.templates.active_templates().await?;
        let mut reports = Vec::with_capacity(templates.len());
        for template in &templates {
            reports.push(self.generate_for(template).await?);
        }
        let total: usize = reports.iter().map(|report| report.created.len()).sum();
        info!(templates = templates.len(), created = total, "generation run complete");
        Ok(reports)
    }

    /// Generates instances for one template.
    ///
    /// A no-op (empty report) when the template is inactive.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Repository`] when the template does not
    /// exist or a store fails.
    pub async fn generate(&self, id: TemplateId) -> GeneratorResult<GenerationReport> {
        let template = self
            .templates
            .find_by_id(id)
            .await?
            .ok_or(SchedulingRepositoryError::TemplateNotFound(id))?;
        self.generate_for(&template).await
    }

    async fn generate_for(
        &self,
        template: &RecurringTaskTemplate,
    ) -> GeneratorResult<GenerationReport> {
        let mut report = GenerationReport {
            template: template.id(),
            created: Vec::new(),
        };
        if !template.is_active() {
            return Ok(report);
        }

        let today = self.clock.utc().date_naive();
        let stop = today
            .checked_add_days(Days::new(u64::from(self.config.horizon_days)))
            .unwrap_or(NaiveDate::MAX);
        let mut last_scheduled = self
            .tasks
            .greatest_scheduled_date(template.id())
            .await?
            .unwrap_or_else(|| template.fallback_last_scheduled());

        // Candidate walk starts the day before today so a task scheduled
        // for yesterday by a missed run still materializes.
        let mut curr = today.pred_opt().unwrap_or(today);
        while curr <= stop {
            if template.date_matches(curr, last_scheduled) {
                if self.materialize(template, curr).await? {
                    report.created.push(curr);
                }
                last_scheduled = last_scheduled.max(curr);
            }
            let Some(next) = curr.succ_opt() else { break };
            curr = next;
        }
        Ok(report)
    }

    /// Creates the instance unless one already occupies the slot.
    ///
    /// Returns whether a new task was stored.
    async fn materialize(
        &self,
        template: &RecurringTaskTemplate,
        date: NaiveDate,
    ) -> GeneratorResult<bool> {
        if self.tasks.exists_for_template_on(template.id(), date).await? {
            return Ok(false);
        }
        let task = Task::from_template(template, date, &*self.clock);
        match self.tasks.store(&task).await {
            Ok(()) => Ok(true),
            // Lost the race to a concurrent run; the slot is filled.
            Err(SchedulingRepositoryError::DuplicateInstance { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
