//! End-to-end pipeline test over the in-memory adapters: generate
//! instances from a recurrence template, claim work through the ledger,
//! then run the reminder planner against the resulting state.

mod test_helpers;

use std::sync::Arc;

use corvee::claim::adapters::memory::{InMemoryClaimRepository, InMemoryWorkRepository};
use corvee::claim::ports::ClaimRepository;
use corvee::claim::services::{ClaimLedger, ClaimRequest};
use corvee::directory::adapters::memory::InMemoryDirectory;
use corvee::directory::domain::{EmailAddress, Member, Tag, Tagging};
use corvee::directory::ports::MemberDirectory;
use corvee::reminder::adapters::memory::{InMemoryNagRepository, RecordingNotifier};
use corvee::reminder::ports::NagRepository;
use corvee::reminder::services::{ReminderConfig, ReminderPlanner};
use corvee::scheduling::adapters::memory::{InMemoryTaskRepository, InMemoryTemplateRepository};
use corvee::scheduling::domain::{
    OrdinalSet, RecurrenceSpec, RecurringTaskTemplate, Task, TaskDescriptor, WeekdaySet,
    WorkDuration,
};
use corvee::scheduling::ports::{TaskRepository, TemplateRepository};
use corvee::scheduling::services::{GeneratorConfig, InstanceGenerator};
use chrono::NaiveDate;
use eyre::{OptionExt, Result};
use rstest::rstest;
use test_helpers::FrozenClock;

struct Engine {
    directory: Arc<InMemoryDirectory>,
    templates: Arc<InMemoryTemplateRepository>,
    tasks: Arc<InMemoryTaskRepository>,
    claims: Arc<InMemoryClaimRepository>,
    nags: Arc<InMemoryNagRepository>,
    notifier: Arc<RecordingNotifier>,
    generator: InstanceGenerator<InMemoryTemplateRepository, InMemoryTaskRepository, FrozenClock>,
    ledger: ClaimLedger<
        InMemoryDirectory,
        InMemoryTemplateRepository,
        InMemoryTaskRepository,
        InMemoryClaimRepository,
        InMemoryWorkRepository,
        FrozenClock,
    >,
    planner: ReminderPlanner<
        InMemoryDirectory,
        InMemoryTemplateRepository,
        InMemoryTaskRepository,
        InMemoryClaimRepository,
        InMemoryWorkRepository,
        InMemoryNagRepository,
        RecordingNotifier,
        FrozenClock,
    >,
    clock: FrozenClock,
}

/// Wires the whole engine over in-memory adapters, frozen on Wednesday
/// 2025-01-01. January 2025's Thursdays fall on the 2nd, 9th, 16th,
/// 23rd, and 30th.
fn engine() -> Engine {
    let directory = Arc::new(InMemoryDirectory::new());
    let templates = Arc::new(InMemoryTemplateRepository::new());
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let claims = Arc::new(InMemoryClaimRepository::new());
    let works = Arc::new(InMemoryWorkRepository::new());
    let nags = Arc::new(InMemoryNagRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let clock = FrozenClock::on(2025, 1, 1);

    let generator = InstanceGenerator::new(
        Arc::clone(&templates),
        Arc::clone(&tasks),
        Arc::new(clock),
        GeneratorConfig::default(),
    );
    let ledger = ClaimLedger::new(
        Arc::clone(&directory),
        Arc::clone(&templates),
        Arc::clone(&tasks),
        Arc::clone(&claims),
        Arc::clone(&works),
        Arc::new(clock),
    );
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

    Engine {
        directory,
        templates,
        tasks,
        claims,
        nags,
        notifier,
        generator,
        ledger,
        planner,
        clock,
    }
}

async fn seed_member(engine: &Engine, username: &str) -> Result<Member> {
    let address = EmailAddress::new(format!("{username}@example.org"))?;
    let member = Member::new(username)?.with_email(address);
    engine.directory.store_member(&member).await?;
    Ok(member)
}

/// First-and-third-Thursday template for opening the shop, with a
/// designated default claimant.
async fn seed_template(
    engine: &Engine,
    default_claimant: &Member,
    explicit: &Member,
    tag: &Tag,
) -> Result<RecurringTaskTemplate> {
    let descriptor = TaskDescriptor::new("Open the shop")?
        .with_instructions("Unlock, lights on, sign out front")
        .with_eligible_claimants([default_claimant.id(), explicit.id()])
        .with_eligible_tags([tag.id()])
        .with_work_estimate(WorkDuration::from_hours(2)?);
    let spec = RecurrenceSpec {
        weekdays: WeekdaySet {
            thursday: true,
            ..WeekdaySet::default()
        },
        ordinals: OrdinalSet {
            first: true,
            third: true,
            ..OrdinalSet::default()
        },
        ..RecurrenceSpec::default()
    };
    let template = RecurringTaskTemplate::new(descriptor, engine.clock.date(), spec)?
        .with_default_claimant(default_claimant.id());
    engine.templates.store(&template).await?;
    Ok(template)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn generation_is_idempotent_and_claiming_feeds_the_planner() -> Result<()> {
    let engine = engine();
    let dana = seed_member(&engine, "dana").await?;
    let bob = seed_member(&engine, "bob").await?;
    let alice = seed_member(&engine, "alice").await?;
    let tag = Tag::new("Opener", "Allowed to open the shop")?;
    engine.directory.store_tag(&tag).await?;
    engine
        .directory
        .store_tagging(&Tagging::new(alice.id(), tag.id(), None, &engine.clock))
        .await?;
    let template = seed_template(&engine, &dana, &bob, &tag).await?;

    // First and third Thursdays inside the 28-day horizon.
    let report = engine.generator.generate(template.id()).await?;
    assert_eq!(report.created, vec![date(2025, 1, 2), date(2025, 1, 16)]);

    // Re-running over the same window creates nothing new.
    let rerun = engine.generator.generate(template.id()).await?;
    assert!(rerun.created.is_empty());
    let instances = engine.tasks.tasks_for_template(template.id()).await?;
    assert_eq!(instances.len(), 2);

    // The default claimant takes tomorrow's instance but never verifies.
    let tomorrow_task = instances
        .iter()
        .find(|task| task.scheduled_date() == Some(date(2025, 1, 2)))
        .ok_or_eyre("tomorrow's instance exists")?;
    engine
        .ledger
        .create_claim(ClaimRequest {
            member: dana.id(),
            task: tomorrow_task.id(),
            duration: WorkDuration::from_hours(2)?,
            start_time: None,
        })
        .await?;

    // Claim-creation guards keep claimants inside the eligible pool.
    let claimants = engine
        .ledger
        .eligibility()
        .current_claimants(tomorrow_task)
        .await?;
    let pool = engine
        .ledger
        .eligibility()
        .eligible_members(tomorrow_task.descriptor())
        .await?;
    assert!(claimants.is_subset(&pool));

    let planner_report = engine.planner.run().await;

    // Pass 1 abandons the silent default claim; pass 3 then solicits the
    // full pool for the understaffed Thursday task.
    assert_eq!(planner_report.abandoned, 1);
    assert_eq!(planner_report.verifications_sent, 0);
    assert_eq!(planner_report.nags_sent, 3);
    assert!(
        engine
            .claims
            .current_claims_for_task(tomorrow_task.id())
            .await?
            .is_empty()
    );

    let outbox = engine.notifier.sent();
    assert_eq!(outbox.len(), 3);
    for email in &outbox {
        assert_eq!(email.subject, "Call for Volunteers, Wed Jan 01");
        assert!(email.text_body.contains("Open the shop"));
    }

    // Every nag carries its own single-use token digest.
    let mut digests = Vec::new();
    for member in [dana.id(), bob.id(), alice.id()] {
        for nag in engine.nags.nags_for_member(member).await? {
            digests.push(nag.token_digest().clone());
        }
    }
    assert_eq!(digests.len(), 3);
    digests.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    digests.dedup();
    assert_eq!(digests.len(), 3);

    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claimed_work_flows_to_closure() -> Result<()> {
    let engine = engine();
    let dana = seed_member(&engine, "dana").await?;
    let bob = seed_member(&engine, "bob").await?;
    let alice = seed_member(&engine, "alice").await?;
    let tag = Tag::new("Opener", "Allowed to open the shop")?;
    engine.directory.store_tag(&tag).await?;
    engine
        .directory
        .store_tagging(&Tagging::new(alice.id(), tag.id(), None, &engine.clock))
        .await?;
    let template = seed_template(&engine, &dana, &bob, &tag).await?;
    engine.generator.generate(template.id()).await?;

    let instances = engine.tasks.tasks_for_template(template.id()).await?;
    let later_task = instances
        .iter()
        .find(|task| task.scheduled_date() == Some(date(2025, 1, 16)))
        .ok_or_eyre("third-Thursday instance exists")?;

    // Alice is eligible through her tag, claims, works, and finishes.
    let claim = engine
        .ledger
        .create_claim(ClaimRequest {
            member: alice.id(),
            task: later_task.id(),
            duration: WorkDuration::from_hours(2)?,
            start_time: None,
        })
        .await?;
    engine
        .ledger
        .record_work(claim.id(), WorkDuration::from_hours(2)?, date(2025, 1, 16))
        .await?;

    let mut finished: Task = engine
        .tasks
        .find_by_id(later_task.id())
        .await?
        .ok_or_eyre("task exists")?;
    finished.mark_work_done();
    engine.tasks.update(&finished).await?;

    let reloaded = engine
        .tasks
        .find_by_id(later_task.id())
        .await?
        .ok_or_eyre("task exists")?;
    // No reviewer is assigned, so completed work closes the task.
    assert!(reloaded.is_closed());

    // The fully claimed task would no longer accept another claimant.
    let rejected = engine
        .ledger
        .create_claim(ClaimRequest {
            member: bob.id(),
            task: later_task.id(),
            duration: WorkDuration::from_hours(1)?,
            start_time: None,
        })
        .await;
    assert!(rejected.is_err());

    Ok(())
}
