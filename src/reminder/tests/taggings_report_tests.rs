//! Tests for the new-taggings report.

use std::sync::Arc;

use crate::directory::{
    adapters::memory::InMemoryDirectory,
    domain::{EmailAddress, Member, Tag, Tagging},
    ports::MemberDirectory,
};
use crate::reminder::{
    adapters::memory::RecordingNotifier,
    services::{ReminderConfig, TaggingsReportService},
};
use crate::test_support::FixedClock;
use rstest::{fixture, rstest};

type TestService = TaggingsReportService<InMemoryDirectory, RecordingNotifier, FixedClock>;

struct Harness {
    directory: Arc<InMemoryDirectory>,
    notifier: Arc<RecordingNotifier>,
    service: TestService,
    yesterday_clock: FixedClock,
}

#[fixture]
fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier = Arc::new(RecordingNotifier::new());
    // The report runs "today"; the taggings were recorded "yesterday".
    let today = FixedClock::on(2025, 6, 3);
    let yesterday_clock = FixedClock::on(2025, 6, 2);
    let service = TaggingsReportService::new(
        Arc::clone(&directory),
        Arc::clone(&notifier),
        Arc::new(today),
        ReminderConfig::default(),
    );
    Harness {
        directory,
        notifier,
        service,
        yesterday_clock,
    }
}

async fn seed_member(directory: &InMemoryDirectory, username: &str, with_email: bool) -> Member {
    let mut member = Member::new(username).expect("valid member");
    if with_email {
        let address = EmailAddress::new(format!("{username}@example.org")).expect("valid email");
        member = member.with_email(address);
    }
    directory.store_member(&member).await.expect("member stored");
    member
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn yesterdays_taggings_are_reported_to_their_authorizer(harness: Harness) {
    let authorizer = seed_member(&harness.directory, "instructor", true).await;
    let student_one = seed_member(&harness.directory, "student1", false).await;
    let student_two = seed_member(&harness.directory, "student2", false).await;
    let tag = Tag::new("Woodshop", "").expect("valid tag");
    harness.directory.store_tag(&tag).await.expect("tag stored");

    for student in [&student_one, &student_two] {
        let tagging = Tagging::new(
            student.id(),
            tag.id(),
            Some(authorizer.id()),
            &harness.yesterday_clock,
        );
        harness
            .directory
            .store_tagging(&tagging)
            .await
            .expect("tagging stored");
    }

    let sent = harness.service.send_reports().await.expect("report runs");

    assert_eq!(sent, 1);
    let outbox = harness.notifier.sent();
    assert_eq!(outbox.len(), 1);
    let email = outbox.first().expect("one email");
    assert_eq!(email.to.as_str(), "instructor@example.org");
    assert_eq!(email.subject, "New Taggings Report, Tue Jun 03");
    assert!(email.text_body.contains("student1"));
    assert!(email.text_body.contains("student2"));
    assert!(email.text_body.contains("Woodshop"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_and_old_taggings_are_ignored(harness: Harness) {
    let authorizer = seed_member(&harness.directory, "instructor", true).await;
    let student = seed_member(&harness.directory, "student1", false).await;
    let other = seed_member(&harness.directory, "student2", false).await;
    let tag = Tag::new("Laser", "").expect("valid tag");
    harness.directory.store_tag(&tag).await.expect("tag stored");

    // No authorizing member recorded.
    let anonymous = Tagging::new(student.id(), tag.id(), None, &harness.yesterday_clock);
    harness
        .directory
        .store_tagging(&anonymous)
        .await
        .expect("tagging stored");

    // Authorized, but a week before the report window.
    let stale_clock = FixedClock::on(2025, 5, 27);
    let stale = Tagging::new(other.id(), tag.id(), Some(authorizer.id()), &stale_clock);
    harness
        .directory
        .store_tagging(&stale)
        .await
        .expect("tagging stored");

    let sent = harness.service.send_reports().await.expect("report runs");
    assert_eq!(sent, 0);
    assert!(harness.notifier.sent().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn authorizers_without_email_are_skipped(harness: Harness) {
    let authorizer = seed_member(&harness.directory, "instructor", false).await;
    let student = seed_member(&harness.directory, "student1", false).await;
    let tag = Tag::new("Welding", "").expect("valid tag");
    harness.directory.store_tag(&tag).await.expect("tag stored");
    let tagging = Tagging::new(
        student.id(),
        tag.id(),
        Some(authorizer.id()),
        &harness.yesterday_clock,
    );
    harness
        .directory
        .store_tagging(&tagging)
        .await
        .expect("tagging stored");

    let sent = harness.service.send_reports().await.expect("report runs");
    assert_eq!(sent, 0);
    assert!(harness.notifier.sent().is_empty());
}
