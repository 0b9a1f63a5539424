//! The three-pass reminder planner.
//!
//! Passes always run in the same order because each depends on state the
//! previous pass may have changed:
//!
//! 1. **Abandon**: delete stale, unverified default-claimant claims on
//!    tasks one to two days out, reopening those tasks to the pool.
//! 2. **Verify**: ask default claimants with tasks three to four days out
//!    to confirm, via a single-use token link.
//! 3. **Nag for workers**: solicit eligible members for understaffed
//!    tasks scheduled today through two days out, suppressing members who
//!    are already heavily scheduled unless the task is a panic situation.
//!
//! A delivery failure for one member never aborts processing of the
//! remaining members.

use crate::claim::{
    domain::{Claim, ClaimId},
    ports::{ClaimRepository, ClaimRepositoryError, WorkRepository},
    services::{ClaimLedger, ClaimLedgerError, EligibilityError},
};
use crate::directory::domain::{EmailAddress, MemberId};
use crate::directory::ports::{DirectoryRepositoryError, MemberDirectory};
use crate::reminder::domain::{AuthToken, Nag};
use crate::reminder::ports::{NagRepository, NagRepositoryError, Notifier, OutboundEmail};
use crate::reminder::services::templates::{self, RenderError, TaskSummary};
use crate::scheduling::domain::{Priority, Task, TaskId};
use crate::scheduling::ports::{SchedulingRepositoryError, TaskRepository, TemplateRepository};
use chrono::{Days, Duration, NaiveDate};
use mockable::Clock;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// A member is heavily scheduled once their committed claim time over the
/// next two weeks reaches this threshold.
const HEAVY_SCHEDULE_HOURS: i64 = 6;

/// Reminder configuration supplied by the external scheduler.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    /// Base URL interpolated into reminder links.
    pub host: String,
    /// Optional blind-copy recipient for every outbound reminder.
    pub bcc: Option<EmailAddress>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8000".to_owned(),
            bcc: None,
        }
    }
}

/// Counts from one planner run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunReport {
    /// Claims abandoned by pass 1.
    pub abandoned: usize,
    /// Verification requests issued by pass 2.
    pub verifications_sent: usize,
    /// Call-for-volunteers nags issued by pass 3.
    pub nags_sent: usize,
}

/// Service-level errors for reminder planning.
#[derive(Debug, Error)]
pub enum ReminderPlannerError {
    /// Claim ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] ClaimLedgerError),

    /// Eligibility computation failed.
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),

    /// Template or task lookup failed.
    #[error(transparent)]
    Scheduling(#[from] SchedulingRepositoryError),

    /// Claim lookup failed.
    #[error(transparent)]
    Claims(#[from] ClaimRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),

    /// Nag persistence failed.
    #[error(transparent)]
    Nags(#[from] NagRepositoryError),

    /// Email rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for reminder planner operations.
pub type ReminderResult<T> = Result<T, ReminderPlannerError>;

/// Orchestrates the three reminder passes.
#[derive(Clone)]
pub struct ReminderPlanner<D, TPL, TSK, CR, WR, NR, N, C>
where
    D: MemberDirectory,
    TPL: TemplateRepository,
    TSK: TaskRepository,
    CR: ClaimRepository,
    WR: WorkRepository,
    NR: NagRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    ledger: ClaimLedger<D, TPL, TSK, CR, WR, C>,
    directory: Arc<D>,
    templates: Arc<TPL>,
    tasks: Arc<TSK>,
    claims: Arc<CR>,
    nags: Arc<NR>,
    notifier: Arc<N>,
    clock: Arc<C>,
    config: ReminderConfig,
}

impl<D, TPL, TSK, CR, WR, NR, N, C> ReminderPlanner<D, TPL, TSK, CR, WR, NR, N, C>
where
    D: MemberDirectory,
    TPL: TemplateRepository,
    TSK: TaskRepository,
    CR: ClaimRepository,
    WR: WorkRepository,
    NR: NagRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a reminder planner and its internal claim ledger.
    #[must_use]
    pub fn new(
        directory: Arc<D>,
        templates: Arc<TPL>,
        tasks: Arc<TSK>,
        claims: Arc<CR>,
        works: Arc<WR>,
        nags: Arc<NR>,
        notifier: Arc<N>,
        clock: Arc<C>,
        config: ReminderConfig,
    ) -> Self {
        let ledger = ClaimLedger::new(
            Arc::clone(&directory),
            Arc::clone(&templates),
            Arc::clone(&tasks),
            Arc::clone(&claims),
            works,
            Arc::clone(&clock),
        );
        Self {
            ledger,
            directory,
            templates,
            tasks,
            claims,
            nags,
            notifier,
            clock,
            config,
        }
    }

    /// Returns the ledger sharing this planner's ports.
    #[must_use]
    pub const fn ledger(&self) -> &ClaimLedger<D, TPL, TSK, CR, WR, C> {
        &self.ledger
    }

    /// Runs the three passes in order.
    ///
    /// A failed pass is logged and does not prevent the later passes from
    /// running.
    pub async fn run(&self) -> ReminderRunReport {
        let mut report = ReminderRunReport::default();
        // Order is significant.
        match self.ledger.abandon_stale_default_claims().await {
            Ok(abandoned) => report.abandoned = abandoned,
            Err(err) => warn!(error = %err, "abandon pass failed"),
        }
        match self.verify_default_claims().await {
            Ok(sent) => report.verifications_sent = sent,
            Err(err) => warn!(error = %err, "verify pass failed"),
        }
        match self.nag_for_workers().await {
            Ok(sent) => report.nags_sent = sent,
            Err(err) => warn!(error = %err, "nag pass failed"),
        }
        report
    }

    /// Pass 2: asks default claimants with unverified claims on tasks
    /// three to four days out to confirm their availability.
    ///
    /// Returns the number of verification requests issued.
    ///
    /// # Errors
    ///
    /// Returns a lookup, persistence, or rendering error; per-recipient
    /// delivery failures are logged and skipped instead.
    pub async fn verify_default_claims(&self) -> ReminderResult<usize> {
        let today = self.clock.utc().date_naive();
        let from = add_days(today, 3);
        let to = add_days(today, 4);

        let mut sent = 0_usize;
        for task in self.tasks.scheduled_between(from, to).await? {
            let Some(template_id) = task.template() else {
                continue;
            };
            let Some(template) = self.templates.find_by_id(template_id).await? else {
                continue;
            };
            let Some(default_claimant) = template.default_claimant() else {
                continue;
            };
            for claim in self.claims.current_claims_for_task(task.id()).await? {
                if claim.member() != default_claimant || claim.is_verified() {
                    continue;
                }
                if self.send_verification(&task, &claim).await? {
                    sent += 1;
                }
            }
        }
        info!(sent, "claim verification requests issued");
        Ok(sent)
    }

    async fn send_verification(&self, task: &Task, claim: &Claim) -> ReminderResult<bool> {
        let Some(member) = self.directory.find_member(claim.member()).await? else {
            return Ok(false);
        };
        let Some(address) = member.email().cloned() else {
            return Ok(false);
        };

        let (token, _nag) = self
            .issue_nag(member.id(), vec![task.id()], vec![claim.id()])
            .await?;

        let summary = TaskSummary::from_task(task);
        let subject = format!(
            "Please verify your availability for this {}",
            summary.weekday
        );
        let (text_body, html_body) = templates::render_claim_verification(
            member.friendly_name(),
            &summary,
            token.reveal(),
            &self.config.host,
        )?;
        self.deliver(member.id(), address, subject, text_body, html_body)
            .await;
        Ok(true)
    }

    /// Pass 3: solicits eligible members for understaffed `should_nag`
    /// tasks scheduled today through two days out, aggregating all
    /// matching tasks into one nag per member.
    ///
    /// Returns the number of nags issued.
    ///
    /// # Errors
    ///
    /// Returns a lookup, persistence, or rendering error; per-recipient
    /// delivery failures are logged and skipped instead.
    pub async fn nag_for_workers(&self) -> ReminderResult<usize> {
        let today = self.clock.utc().date_naive();
        let heavily_scheduled = self.heavily_scheduled_members(today).await?;
        let excluded = self.excluded_members().await?;

        let mut nag_lists: BTreeMap<MemberId, Vec<Task>> = BTreeMap::new();
        for task in self.tasks.scheduled_between(today, add_days(today, 2)).await? {
            if !task.descriptor().should_nag || task.is_closed() {
                continue;
            }
            if self.ledger.eligibility().is_fully_claimed(&task).await? {
                continue;
            }

            let eligibility = self.ledger.eligibility();
            let mut potentials = eligibility.eligible_members(task.descriptor()).await?;
            potentials = &potentials - &eligibility.current_claimants(&task).await?;
            potentials = &potentials - &eligibility.uninterested_members(task.descriptor());
            potentials = &potentials - &excluded;

            let panic_situation = task.scheduled_date() == Some(today)
                && task.descriptor().priority == Priority::High;
            if !panic_situation {
                // Don't bother heavily scheduled people if it's not time
                // to panic.
                potentials = &potentials - &heavily_scheduled;
            }

            for member in potentials {
                nag_lists.entry(member).or_default().push(task.clone());
            }
        }

        let mut sent = 0_usize;
        for (member_id, tasks) in nag_lists {
            if self.send_call_for_volunteers(member_id, &tasks).await? {
                sent += 1;
            }
        }
        info!(sent, "call-for-volunteers nags issued");
        Ok(sent)
    }

    async fn send_call_for_volunteers(
        &self,
        member_id: MemberId,
        tasks: &[Task],
    ) -> ReminderResult<bool> {
        let Some(member) = self.directory.find_member(member_id).await? else {
            return Ok(false);
        };
        let Some(address) = member.email().cloned() else {
            return Ok(false);
        };

        let (token, _nag) = self
            .issue_nag(
                member.id(),
                tasks.iter().map(Task::id).collect(),
                Vec::new(),
            )
            .await?;

        let summaries: Vec<TaskSummary> = tasks.iter().map(TaskSummary::from_task).collect();
        let today = self.clock.utc().date_naive();
        let subject = format!("Call for Volunteers, {}", today.format("%a %b %d"));
        let (text_body, html_body) = templates::render_call_for_volunteers(
            member.friendly_name(),
            &summaries,
            token.reveal(),
            &self.config.host,
        )?;
        self.deliver(member.id(), address, subject, text_body, html_body)
            .await;
        Ok(true)
    }

    /// Stores a nag carrying a freshly generated token whose digest is
    /// unique against all prior nags. A digest collision, including one
    /// lost to a concurrent writer, silently regenerates the token.
    async fn issue_nag(
        &self,
        who: MemberId,
        tasks: Vec<TaskId>,
        claims: Vec<ClaimId>,
    ) -> ReminderResult<(AuthToken, Nag)> {
        loop {
            let token = AuthToken::generate();
            let digest = token.digest();
            if self.nags.digest_exists(&digest).await? {
                continue;
            }
            let nag = Nag::new(who, digest, &*self.clock)
                .with_tasks(tasks.iter().copied())
                .with_claims(claims.iter().copied());
            match self.nags.store(&nag).await {
                Ok(()) => return Ok((token, nag)),
                Err(NagRepositoryError::DuplicateTokenDigest) => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Returns members already committed to six or more hours of current
    /// claims on tasks scheduled over the next two weeks.
    async fn heavily_scheduled_members(
        &self,
        today: NaiveDate,
    ) -> ReminderResult<BTreeSet<MemberId>> {
        let horizon = add_days(today, 14);
        let mut totals: BTreeMap<MemberId, Duration> = BTreeMap::new();
        for task in self.tasks.scheduled_between(today, horizon).await? {
            for claim in self.claims.current_claims_for_task(task.id()).await? {
                let committed = claim.claimed_duration().as_duration();
                let entry = totals.entry(claim.member()).or_insert_with(Duration::zero);
                *entry = entry.checked_add(&committed).unwrap_or(Duration::MAX);
            }
        }
        let threshold = Duration::hours(HEAVY_SCHEDULE_HOURS);
        Ok(totals
            .into_iter()
            .filter(|(_, total)| *total >= threshold)
            .map(|(member, _)| member)
            .collect())
    }

    /// Members never solicited: nagging disabled, no email address, or
    /// deactivated.
    async fn excluded_members(&self) -> ReminderResult<BTreeSet<MemberId>> {
        let mut excluded = self.directory.members_with_nagging_disabled().await?;
        excluded.extend(self.directory.members_without_email().await?);
        excluded.extend(self.directory.inactive_members().await?);
        Ok(excluded)
    }

    async fn deliver(
        &self,
        member: MemberId,
        to: EmailAddress,
        subject: String,
        text_body: String,
        html_body: String,
    ) {
        let email = OutboundEmail {
            to,
            subject,
            text_body,
            html_body,
            bcc: self.config.bcc.clone(),
        };
        if let Err(err) = self.notifier.send(&email).await {
            warn!(member = %member, error = %err, "reminder delivery failed; skipping recipient");
        }
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}
