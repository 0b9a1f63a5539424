//! Orchestration tests for the three-pass reminder planner.
//!
//! The frozen clock sits on Monday 2025-03-03, so the verify window
//! covers Thursday/Friday and the nag window covers Monday through
//! Wednesday.

use std::sync::Arc;

use crate::claim::{
    adapters::memory::{InMemoryClaimRepository, InMemoryWorkRepository},
    domain::Claim,
    ports::ClaimRepository,
};
use crate::directory::{
    adapters::memory::InMemoryDirectory,
    domain::{EmailAddress, Member, WorkerProfile},
    ports::MemberDirectory,
};
use crate::reminder::{
    adapters::memory::{InMemoryNagRepository, RecordingNotifier},
    ports::{MockNotifier, NagRepository, Notifier, NotifierError},
    services::{ReminderConfig, ReminderPlanner},
};
use crate::scheduling::{
    adapters::memory::{InMemoryTaskRepository, InMemoryTemplateRepository},
    domain::{
        FlexibleDates, Priority, RecurrenceSpec, RecurringTaskTemplate, Task, TaskDescriptor,
        WorkDuration,
    },
    ports::{TaskRepository, TemplateRepository},
};
use crate::test_support::FixedClock;
use chrono::{Days, NaiveDate};
use rstest::{fixture, rstest};

struct Harness<N: Notifier> {
    directory: Arc<InMemoryDirectory>,
    templates: Arc<InMemoryTemplateRepository>,
    tasks: Arc<InMemoryTaskRepository>,
    claims: Arc<InMemoryClaimRepository>,
    nags: Arc<InMemoryNagRepository>,
    notifier: Arc<N>,
    planner: ReminderPlanner<
        InMemoryDirectory,
        InMemoryTemplateRepository,
        InMemoryTaskRepository,
        InMemoryClaimRepository,
        InMemoryWorkRepository,
        InMemoryNagRepository,
        N,
        FixedClock,
    >,
    clock: FixedClock,
}

fn harness_with<N: Notifier>(notifier: N) -> Harness<N> {
    let directory = Arc::new(InMemoryDirectory::new());
    let templates = Arc::new(InMemoryTemplateRepository::new());
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let claims = Arc::new(InMemoryClaimRepository::new());
    let works = Arc::new(InMemoryWorkRepository::new());
    let nags = Arc::new(InMemoryNagRepository::new());
    let notifier = Arc::new(notifier);
    let clock = FixedClock::on(2025, 3, 3);
    let planner = ReminderPlanner::new(
        Arc::clone(&directory),
        Arc::clone(&templates),
        Arc::clone(&tasks),
        Arc::clone(&claims),
        works,
        Arc::clone(&nags),
        Arc::clone(&notifier),
        Arc::new(clock),
        ReminderConfig::default(),
    );
    Harness {
        directory,
        templates,
        tasks,
        claims,
        nags,
        notifier,
        planner,
        clock,
    }
}

#[fixture]
fn harness() -> Harness<RecordingNotifier> {
    harness_with(RecordingNotifier::new())
}

fn hours(value: i64) -> WorkDuration {
    WorkDuration::from_hours(value).expect("valid duration")
}

async fn seed_member(directory: &InMemoryDirectory, username: &str) -> Member {
    let address = EmailAddress::new(format!("{username}@example.org")).expect("valid email");
    let member = Member::new(username)
        .expect("valid member")
        .with_email(address);
    directory.store_member(&member).await.expect("member stored");
    member
}

async fn seed_member_without_email(directory: &InMemoryDirectory, username: &str) -> Member {
    let member = Member::new(username).expect("valid member");
    directory.store_member(&member).await.expect("member stored");
    member
}

fn weekly_spec() -> RecurrenceSpec {
    RecurrenceSpec {
        repeat_days: Some(7),
        flexible_dates: FlexibleDates::No,
        ..RecurrenceSpec::default()
    }
}

async fn seed_task<N: Notifier>(
    harness: &Harness<N>,
    descriptor: TaskDescriptor,
    scheduled: NaiveDate,
) -> Task {
    let task = Task::manual(descriptor, &harness.clock).scheduled_on(scheduled);
    harness.tasks.store(&task).await.expect("task stored");
    task
}

fn offset(clock: FixedClock, days: u64) -> NaiveDate {
    clock
        .date()
        .checked_add_days(Days::new(days))
        .expect("valid date")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn verify_pass_asks_unverified_default_claimants(harness: Harness<RecordingNotifier>) {
    let default_claimant = seed_member(&harness.directory, "default").await;
    let descriptor = TaskDescriptor::new("Open the shop")
        .expect("valid descriptor")
        .with_eligible_claimants([default_claimant.id()]);
    let template = RecurringTaskTemplate::new(descriptor, harness.clock.date(), weekly_spec())
        .expect("valid template")
        .with_default_claimant(default_claimant.id());
    harness
        .templates
        .store(&template)
        .await
        .expect("template stored");
    let task = Task::from_template(&template, offset(harness.clock, 3), &harness.clock);
    harness.tasks.store(&task).await.expect("task stored");
    let claim = Claim::new(task.id(), default_claimant.id(), hours(2), &harness.clock);
    harness
        .claims
        .store(&claim, task.descriptor().max_claimants)
        .await
        .expect("claim stored");

    let sent = harness
        .planner
        .verify_default_claims()
        .await
        .expect("verify pass runs");

    assert_eq!(sent, 1);
    let outbox = harness.notifier.sent();
    assert_eq!(outbox.len(), 1);
    let email = outbox.first().expect("one email");
    assert_eq!(
        email.subject,
        "Please verify your availability for this Thursday"
    );
    assert_eq!(email.to.as_str(), "default@example.org");
    assert!(email.text_body.contains("/tasks/verify/"));

    let nags = harness
        .nags
        .nags_for_member(default_claimant.id())
        .await
        .expect("query succeeds");
    assert_eq!(nags.len(), 1);
    let nag = nags.first().expect("one nag");
    assert_eq!(nag.tasks(), &[task.id()]);
    assert_eq!(nag.claims(), &[claim.id()]);

    // The stored digest is the token's redemption key.
    let redeemed = harness
        .nags
        .find_by_digest(nag.token_digest())
        .await
        .expect("query succeeds")
        .expect("nag found by digest");
    assert_eq!(redeemed.id(), nag.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn verify_pass_skips_verified_claims(harness: Harness<RecordingNotifier>) {
    let default_claimant = seed_member(&harness.directory, "default").await;
    let descriptor = TaskDescriptor::new("Open the shop")
        .expect("valid descriptor")
        .with_eligible_claimants([default_claimant.id()]);
    let template = RecurringTaskTemplate::new(descriptor, harness.clock.date(), weekly_spec())
        .expect("valid template")
        .with_default_claimant(default_claimant.id());
    harness
        .templates
        .store(&template)
        .await
        .expect("template stored");
    let task = Task::from_template(&template, offset(harness.clock, 4), &harness.clock);
    harness.tasks.store(&task).await.expect("task stored");
    let mut claim = Claim::new(task.id(), default_claimant.id(), hours(2), &harness.clock);
    claim.verify(harness.clock.date());
    harness
        .claims
        .store(&claim, task.descriptor().max_claimants)
        .await
        .expect("claim stored");

    let sent = harness
        .planner
        .verify_default_claims()
        .await
        .expect("verify pass runs");
    assert_eq!(sent, 0);
    assert!(harness.notifier.sent().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn nag_pass_aggregates_tasks_into_one_email_per_member(
    harness: Harness<RecordingNotifier>,
) {
    let alice = seed_member(&harness.directory, "alice").await;
    let bob = seed_member(&harness.directory, "bob").await;

    let first = TaskDescriptor::new("Staff the desk")
        .expect("valid descriptor")
        .with_eligible_claimants([alice.id(), bob.id()])
        .with_max_claimants(2);
    let task_one = seed_task(&harness, first, offset(harness.clock, 1)).await;
    let claim = Claim::new(task_one.id(), bob.id(), hours(2), &harness.clock);
    harness.claims.store(&claim, 2).await.expect("claim stored");

    let second = TaskDescriptor::new("Water the plants")
        .expect("valid descriptor")
        .with_eligible_claimants([alice.id()]);
    let task_two = seed_task(&harness, second, offset(harness.clock, 2)).await;

    let sent = harness
        .planner
        .nag_for_workers()
        .await
        .expect("nag pass runs");

    // Bob already holds task one and is not eligible for task two, so
    // only Alice hears about both tasks, in a single message.
    assert_eq!(sent, 1);
    let outbox = harness.notifier.sent();
    assert_eq!(outbox.len(), 1);
    let email = outbox.first().expect("one email");
    assert_eq!(email.to.as_str(), "alice@example.org");
    assert_eq!(email.subject, "Call for Volunteers, Mon Mar 03");
    assert!(email.text_body.contains("Staff the desk"));
    assert!(email.text_body.contains("Water the plants"));
    assert!(email.text_body.contains("/tasks/offer/"));

    let nags = harness
        .nags
        .nags_for_member(alice.id())
        .await
        .expect("query succeeds");
    assert_eq!(nags.len(), 1);
    let nag = nags.first().expect("one nag");
    assert_eq!(nag.tasks().len(), 2);
    assert!(nag.tasks().contains(&task_one.id()));
    assert!(nag.tasks().contains(&task_two.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn nag_pass_skips_fully_claimed_and_muted_tasks(harness: Harness<RecordingNotifier>) {
    let alice = seed_member(&harness.directory, "alice").await;
    let bob = seed_member(&harness.directory, "bob").await;

    let claimed = TaskDescriptor::new("Staff the desk")
        .expect("valid descriptor")
        .with_eligible_claimants([alice.id(), bob.id()])
        .with_max_claimants(1);
    let claimed_task = seed_task(&harness, claimed, offset(harness.clock, 1)).await;
    let claim = Claim::new(claimed_task.id(), bob.id(), hours(2), &harness.clock);
    harness.claims.store(&claim, 1).await.expect("claim stored");

    let muted = TaskDescriptor::new("Quiet chore")
        .expect("valid descriptor")
        .with_eligible_claimants([alice.id()])
        .without_nagging();
    seed_task(&harness, muted, offset(harness.clock, 1)).await;

    let sent = harness
        .planner
        .nag_for_workers()
        .await
        .expect("nag pass runs");
    assert_eq!(sent, 0);
    assert!(harness.notifier.sent().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn nag_pass_excludes_unreachable_and_opted_out_members(
    harness: Harness<RecordingNotifier>,
) {
    let no_email = seed_member_without_email(&harness.directory, "carol").await;
    let inactive = {
        let member = Member::new("dave")
            .expect("valid member")
            .with_email(EmailAddress::new("dave@example.org").expect("valid email"))
            .deactivated();
        harness
            .directory
            .store_member(&member)
            .await
            .expect("member stored");
        member
    };
    let opted_out = seed_member(&harness.directory, "erin").await;
    harness
        .directory
        .update_worker_profile(WorkerProfile {
            member: opted_out.id(),
            should_nag: false,
        })
        .await
        .expect("profile updated");

    let descriptor = TaskDescriptor::new("Staff the desk")
        .expect("valid descriptor")
        .with_eligible_claimants([no_email.id(), inactive.id(), opted_out.id()]);
    seed_task(&harness, descriptor, offset(harness.clock, 1)).await;

    let sent = harness
        .planner
        .nag_for_workers()
        .await
        .expect("nag pass runs");
    assert_eq!(sent, 0);
    assert!(harness.notifier.sent().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn heavily_scheduled_members_are_suppressed_unless_panicking(
    harness: Harness<RecordingNotifier>,
) {
    let heavy = seed_member(&harness.directory, "heavy").await;

    // Six committed hours on a task later in the two-week window.
    let commitment = TaskDescriptor::new("Big build")
        .expect("valid descriptor")
        .with_eligible_claimants([heavy.id()]);
    let committed_task = seed_task(&harness, commitment, offset(harness.clock, 5)).await;
    let claim = Claim::new(committed_task.id(), heavy.id(), hours(6), &harness.clock);
    harness.claims.store(&claim, 1).await.expect("claim stored");

    let routine = TaskDescriptor::new("Routine chore")
        .expect("valid descriptor")
        .with_eligible_claimants([heavy.id()]);
    seed_task(&harness, routine, offset(harness.clock, 1)).await;

    let sent = harness
        .planner
        .nag_for_workers()
        .await
        .expect("nag pass runs");
    // The committed task itself is fully claimed; the routine chore would
    // nag the heavy member but workload suppression removes them.
    assert_eq!(sent, 0);

    let panic = TaskDescriptor::new("Emergency cover")
        .expect("valid descriptor")
        .with_eligible_claimants([heavy.id()])
        .with_priority(Priority::High);
    seed_task(&harness, panic, harness.clock.date()).await;

    let resent = harness
        .planner
        .nag_for_workers()
        .await
        .expect("nag pass runs");
    assert_eq!(resent, 1);
    let outbox = harness.notifier.sent();
    let email = outbox.first().expect("one email");
    assert!(email.text_body.contains("Emergency cover"));
    // Suppression still applies to the non-panic chore in the same run.
    assert!(!email.text_body.contains("Routine chore"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delivery_failure_is_isolated_per_recipient() {
    let mut notifier = MockNotifier::new();
    let mut first_call = true;
    notifier.expect_send().times(2).returning(move |_| {
        if first_call {
            first_call = false;
            Err(NotifierError("smtp timeout".to_owned()))
        } else {
            Ok(())
        }
    });
    let harness = harness_with(notifier);

    let alice = seed_member(&harness.directory, "alice").await;
    let bob = seed_member(&harness.directory, "bob").await;
    let descriptor = TaskDescriptor::new("Staff the desk")
        .expect("valid descriptor")
        .with_eligible_claimants([alice.id(), bob.id()])
        .with_max_claimants(2);
    seed_task(&harness, descriptor, offset(harness.clock, 1)).await;

    let sent = harness
        .planner
        .nag_for_workers()
        .await
        .expect("nag pass runs");

    // Both nags are issued and recorded even though one delivery failed.
    assert_eq!(sent, 2);
    assert_eq!(
        harness
            .nags
            .nags_for_member(alice.id())
            .await
            .expect("query succeeds")
            .len(),
        1
    );
    assert_eq!(
        harness
            .nags
            .nags_for_member(bob.id())
            .await
            .expect("query succeeds")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_abandons_then_reopens_the_task_to_the_pool(harness: Harness<RecordingNotifier>) {
    let default_claimant = seed_member(&harness.directory, "default").await;
    let alice = seed_member(&harness.directory, "alice").await;

    let descriptor = TaskDescriptor::new("Open the shop")
        .expect("valid descriptor")
        .with_eligible_claimants([alice.id()])
        .with_max_claimants(2);
    let template = RecurringTaskTemplate::new(descriptor, harness.clock.date(), weekly_spec())
        .expect("valid template")
        .with_default_claimant(default_claimant.id());
    harness
        .templates
        .store(&template)
        .await
        .expect("template stored");
    let task = Task::from_template(&template, offset(harness.clock, 1), &harness.clock);
    harness.tasks.store(&task).await.expect("task stored");
    let claim = Claim::new(task.id(), default_claimant.id(), hours(2), &harness.clock);
    harness
        .claims
        .store(&claim, task.descriptor().max_claimants)
        .await
        .expect("claim stored");

    let report = harness.planner.run().await;

    // Pass 1 deletes the silent default claim and relists the claimant;
    // pass 3 then solicits the full pool, including the defaulter.
    assert_eq!(report.abandoned, 1);
    assert_eq!(report.verifications_sent, 0);
    assert_eq!(report.nags_sent, 2);
    let recipients: Vec<String> = harness
        .notifier
        .sent()
        .iter()
        .map(|email| email.to.as_str().to_owned())
        .collect();
    assert!(recipients.contains(&"alice@example.org".to_owned()));
    assert!(recipients.contains(&"default@example.org".to_owned()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn issued_nags_never_share_a_token_digest(harness: Harness<RecordingNotifier>) {
    let alice = seed_member(&harness.directory, "alice").await;
    let bob = seed_member(&harness.directory, "bob").await;
    let carol = seed_member(&harness.directory, "carol").await;
    let descriptor = TaskDescriptor::new("Staff the desk")
        .expect("valid descriptor")
        .with_eligible_claimants([alice.id(), bob.id(), carol.id()])
        .with_max_claimants(3);
    seed_task(&harness, descriptor, offset(harness.clock, 1)).await;

    let sent = harness
        .planner
        .nag_for_workers()
        .await
        .expect("nag pass runs");
    assert_eq!(sent, 3);

    let mut digests = Vec::new();
    for member in [alice.id(), bob.id(), carol.id()] {
        for nag in harness
            .nags
            .nags_for_member(member)
            .await
            .expect("query succeeds")
        {
            digests.push(nag.token_digest().clone());
        }
    }
    digests.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    digests.dedup();
    assert_eq!(digests.len(), 3);
}
