//! Domain-focused tests for descriptors, templates, and tasks.

use crate::directory::domain::MemberId;
use crate::scheduling::domain::{
    FlexibleDates, RecurrenceSpec, RecurringTaskTemplate, SchedulingDomainError, Task,
    TaskDescriptor, WorkDuration,
};
use crate::test_support::FixedClock;
use chrono::{Duration, NaiveDate};
use rstest::{fixture, rstest};
use serde_json::Value;

#[fixture]
fn clock() -> FixedClock {
    FixedClock::on(2025, 3, 3)
}

fn descriptor() -> TaskDescriptor {
    TaskDescriptor::new("Open the shop")
        .expect("valid descriptor")
        .with_eligible_claimants([MemberId::new()])
}

fn weekly_template() -> RecurringTaskTemplate {
    let spec = RecurrenceSpec {
        repeat_days: Some(7),
        flexible_dates: FlexibleDates::No,
        ..RecurrenceSpec::default()
    };
    let start = NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date");
    RecurringTaskTemplate::new(descriptor(), start, spec).expect("valid template")
}

#[rstest]
fn descriptor_rejects_empty_short_desc() {
    assert_eq!(
        TaskDescriptor::new("  "),
        Err(SchedulingDomainError::EmptyShortDesc)
    );
}

#[rstest]
fn descriptor_requires_an_eligible_pool() {
    let bare = TaskDescriptor::new("Sweep up").expect("valid descriptor");
    assert_eq!(bare.validate(), Err(SchedulingDomainError::NoEligiblePool));
}

#[rstest]
fn work_duration_rejects_non_positive_values() {
    assert!(WorkDuration::new(Duration::zero()).is_err());
    assert!(WorkDuration::new(Duration::hours(-1)).is_err());
    assert!(WorkDuration::from_hours(2).is_ok());
}

#[rstest]
fn template_rejects_invalid_descriptor() {
    let bare = TaskDescriptor::new("Sweep up").expect("valid descriptor");
    let spec = RecurrenceSpec {
        repeat_days: Some(7),
        flexible_dates: FlexibleDates::No,
        ..RecurrenceSpec::default()
    };
    let start = NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date");
    assert_eq!(
        RecurringTaskTemplate::new(bare, start, spec),
        Err(SchedulingDomainError::NoEligiblePool)
    );
}

#[rstest]
fn fallback_last_scheduled_is_the_day_before_start() {
    let template = weekly_template();
    assert_eq!(
        template.fallback_last_scheduled(),
        NaiveDate::from_ymd_opt(2025, 3, 2).expect("valid date")
    );
}

#[rstest]
fn generated_task_copies_descriptor_and_links_template(clock: FixedClock) {
    let template = weekly_template();
    let scheduled = NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date");

    let task = Task::from_template(&template, scheduled, &clock);

    assert_eq!(task.descriptor(), template.descriptor());
    assert_eq!(task.scheduled_date(), Some(scheduled));
    assert_eq!(task.creation_date(), clock.date());
    assert_eq!(task.template(), Some(template.id()));
    assert!(task.validate().is_ok());
}

#[rstest]
fn task_without_reviewer_closes_on_work_done(clock: FixedClock) {
    let mut task = Task::manual(descriptor(), &clock);
    assert!(task.is_open());
    task.mark_work_done();
    assert!(task.is_closed());
}

#[rstest]
fn task_with_reviewer_needs_acceptance_to_close(clock: FixedClock) {
    let reviewed = descriptor().with_reviewer(MemberId::new());
    let mut task = Task::manual(reviewed, &clock);
    task.mark_work_done();
    assert!(task.is_open());
    task.review(true).expect("review after completion");
    assert!(task.is_closed());
}

#[rstest]
fn review_before_completion_is_rejected(clock: FixedClock) {
    let mut task = Task::manual(descriptor(), &clock);
    assert_eq!(
        task.review(true),
        Err(SchedulingDomainError::ReviewBeforeCompletion)
    );
}

#[rstest]
fn rejected_review_keeps_the_task_open(clock: FixedClock) {
    let reviewed = descriptor().with_reviewer(MemberId::new());
    let mut task = Task::manual(reviewed, &clock);
    task.mark_work_done();
    task.review(false).expect("review after completion");
    assert!(task.is_open());
}

#[rstest]
fn persisted_state_violations_are_caught_by_validate(clock: FixedClock) {
    let template = weekly_template();
    let scheduled = NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date");
    let task = Task::from_template(&template, scheduled, &clock);

    // A template-linked row that lost its scheduled date, as could arrive
    // from a corrupted store.
    let mut unscheduled_row = serde_json::to_value(&task).expect("task serializes");
    if let Some(slot) = unscheduled_row.get_mut("scheduled_date") {
        *slot = Value::Null;
    }
    let unscheduled: Task = serde_json::from_value(unscheduled_row).expect("task deserializes");
    assert_eq!(
        unscheduled.validate(),
        Err(SchedulingDomainError::UnscheduledTemplateInstance)
    );

    // A review verdict without completed work.
    let mut reviewed_row = serde_json::to_value(&task).expect("task serializes");
    if let Some(slot) = reviewed_row.get_mut("work_accepted") {
        *slot = Value::Bool(true);
    }
    let reviewed: Task = serde_json::from_value(reviewed_row).expect("task deserializes");
    assert_eq!(
        reviewed.validate(),
        Err(SchedulingDomainError::ReviewBeforeCompletion)
    );
}
