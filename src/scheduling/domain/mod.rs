//! Domain model for recurrence rules, templates, and task instances.
//!
//! Recurrence flags are validated at construction time into the
//! [`Recurrence`] enum, making conflicting mode combinations
//! unrepresentable afterwards. Descriptive fields shared between template
//! and instance live in [`TaskDescriptor`], copied once at generation time
//! and never re-synced.

mod descriptor;
mod duration;
mod error;
mod ids;
mod recurrence;
mod task;
mod template;

pub use descriptor::{Priority, TaskDescriptor};
pub use duration::{InvalidWorkDuration, WorkDuration};
pub use error::SchedulingDomainError;
pub use ids::{TaskId, TemplateId};
pub use recurrence::{FlexibleDates, OrdinalSet, Recurrence, RecurrenceSpec, WeekdaySet};
pub use task::Task;
pub use template::RecurringTaskTemplate;
