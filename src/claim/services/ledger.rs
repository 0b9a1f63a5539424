//! The claim ledger: claim creation, verification, expiry, work logging,
//! and default-claimant abandonment.

use crate::claim::{
    domain::{Claim, ClaimDomainError, ClaimId, Work},
    ports::{ClaimRepository, ClaimRepositoryError, WorkRepository},
    services::{EligibilityError, EligibilityService},
};
use crate::directory::domain::MemberId;
use crate::directory::ports::{DirectoryRepositoryError, MemberDirectory};
use crate::scheduling::domain::{Task, TaskId, WorkDuration};
use crate::scheduling::ports::{
    SchedulingRepositoryError, TaskRepository, TemplateRepository,
};
use chrono::{Days, NaiveDate, NaiveTime};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for claim ledger operations.
#[derive(Debug, Error)]
pub enum ClaimLedgerError {
    /// The member is not in the task's eligible pool.
    #[error("member {member} is not eligible to claim task {task}")]
    IneligibleClaimant {
        /// The rejected member.
        member: MemberId,
        /// The task they tried to claim.
        task: TaskId,
    },

    /// The member has marked themselves uninterested in the task.
    #[error("member {member} is uninterested in task {task}")]
    UninterestedClaimant {
        /// The rejected member.
        member: MemberId,
        /// The task they tried to claim.
        task: TaskId,
    },

    /// The task already has its maximum number of current claims.
    #[error("task {0} is fully claimed")]
    TaskFullyClaimed(TaskId),

    /// The member previously held a claim on this task. Somebody else has
    /// to get a chance at it.
    #[error("member {member} has already held a claim on task {task}")]
    ClaimAlreadyHeld {
        /// The rejected member.
        member: MemberId,
        /// The task they tried to reclaim.
        task: TaskId,
    },

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The referenced member does not exist.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// The referenced claim does not exist.
    #[error("claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ClaimDomainError),

    /// Eligibility computation failed.
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),

    /// Claim or work persistence failed.
    #[error(transparent)]
    Claims(#[from] ClaimRepositoryError),

    /// Template or task persistence failed.
    #[error(transparent)]
    Scheduling(#[from] SchedulingRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),
}

/// Result type for claim ledger operations.
pub type ClaimLedgerResult<T> = Result<T, ClaimLedgerError>;

/// Request payload for claiming a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    /// The claiming member.
    pub member: MemberId,
    /// The task being claimed.
    pub task: TaskId,
    /// The work time the member commits to.
    pub duration: WorkDuration,
    /// The time of day the member intends to start, if declared.
    pub start_time: Option<NaiveTime>,
}

/// State machine governing claim and work records per task.
#[derive(Clone)]
pub struct ClaimLedger<D, TPL, TSK, CR, WR, C>
where
    D: MemberDirectory,
    TPL: TemplateRepository,
    TSK: TaskRepository,
    CR: ClaimRepository,
    WR: WorkRepository,
    C: Clock + Send + Sync,
{
    eligibility: EligibilityService<D, CR>,
    directory: Arc<D>,
    templates: Arc<TPL>,
    tasks: Arc<TSK>,
    claims: Arc<CR>,
    works: Arc<WR>,
    clock: Arc<C>,
}

impl<D, TPL, TSK, CR, WR, C> ClaimLedger<D, TPL, TSK, CR, WR, C>
where
    D: MemberDirectory,
    TPL: TemplateRepository,
    TSK: TaskRepository,
    CR: ClaimRepository,
    WR: WorkRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new claim ledger.
    #[must_use]
    pub fn new(
        directory: Arc<D>,
        templates: Arc<TPL>,
        tasks: Arc<TSK>,
        claims: Arc<CR>,
        works: Arc<WR>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            eligibility: EligibilityService::new(Arc::clone(&directory), Arc::clone(&claims)),
            directory,
            templates,
            tasks,
            claims,
            works,
            clock,
        }
    }

    /// Returns the eligibility service sharing this ledger's ports.
    #[must_use]
    pub const fn eligibility(&self) -> &EligibilityService<D, CR> {
        &self.eligibility
    }

    /// Creates a `Current` claim for an eligible member.
    ///
    /// The service-level checks are fast paths; the repository re-checks
    /// the (task, member) uniqueness and the claimant cap inside its
    /// transaction, so concurrent creations cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimLedgerError::IneligibleClaimant`],
    /// [`ClaimLedgerError::UninterestedClaimant`],
    /// [`ClaimLedgerError::TaskFullyClaimed`], or
    /// [`ClaimLedgerError::ClaimAlreadyHeld`] when the request violates a
    /// claim rule, and lookup/persistence errors otherwise.
    pub async fn create_claim(&self, request: ClaimRequest) -> ClaimLedgerResult<Claim> {
        let task = self.require_task(request.task).await?;
        if self.directory.find_member(request.member).await?.is_none() {
            return Err(ClaimLedgerError::MemberNotFound(request.member));
        }

        let descriptor = task.descriptor();
        if descriptor.uninterested.contains(&request.member) {
            return Err(ClaimLedgerError::UninterestedClaimant {
                member: request.member,
                task: request.task,
            });
        }
        let pool = self.eligibility.eligible_members(descriptor).await?;
        if !pool.contains(&request.member) {
            return Err(ClaimLedgerError::IneligibleClaimant {
                member: request.member,
                task: request.task,
            });
        }
        if self.eligibility.is_fully_claimed(&task).await? {
            return Err(ClaimLedgerError::TaskFullyClaimed(request.task));
        }

        let mut claim = Claim::new(request.task, request.member, request.duration, &*self.clock);
        if let Some(start_time) = request.start_time {
            claim = claim.with_start_time(start_time);
        }
        match self.claims.store(&claim, descriptor.max_claimants).await {
            Ok(()) => Ok(claim),
            Err(ClaimRepositoryError::DuplicateClaim { task: t, member }) => {
                Err(ClaimLedgerError::ClaimAlreadyHeld { member, task: t })
            }
            Err(ClaimRepositoryError::ClaimCapReached(t)) => {
                Err(ClaimLedgerError::TaskFullyClaimed(t))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Appends a work record against a claim. The claim itself is never
    /// mutated; work can be logged against historical claims regardless
    /// of status.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimLedgerError::ClaimNotFound`] when the claim does
    /// not exist, or a persistence error.
    pub async fn record_work(
        &self,
        claim_id: ClaimId,
        duration: WorkDuration,
        work_date: NaiveDate,
    ) -> ClaimLedgerResult<Work> {
        let claim = self.require_claim(claim_id).await?;
        let work = Work::new(
            claim.member(),
            claim.task(),
            Some(claim_id),
            duration,
            work_date,
        );
        self.works.store(&work).await?;
        Ok(work)
    }

    /// Records the claimant's explicit confirmation of a default claim.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimLedgerError::ClaimNotFound`] when the claim does
    /// not exist, or a persistence error.
    pub async fn verify_claim(&self, claim_id: ClaimId) -> ClaimLedgerResult<Claim> {
        let mut claim = self.require_claim(claim_id).await?;
        claim.verify(self.clock.utc().date_naive());
        self.claims.update(&claim).await?;
        Ok(claim)
    }

    /// Expires a current claim.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimLedgerError::Domain`] when the claim is not
    /// current, [`ClaimLedgerError::ClaimNotFound`] when it does not
    /// exist, or a persistence error.
    pub async fn expire_claim(&self, claim_id: ClaimId) -> ClaimLedgerResult<Claim> {
        let mut claim = self.require_claim(claim_id).await?;
        claim.expire()?;
        self.claims.update(&claim).await?;
        Ok(claim)
    }

    /// Deletes current, unverified default-claimant claims on tasks
    /// scheduled one to two days out.
    ///
    /// Reaching this point means the default claimant was asked to verify
    /// twice without answering. Before each deletion the claimant is
    /// added to the task's eligible-claimant list if missing, so the
    /// follow-up solicitation reaches the full eligible pool rather than
    /// just the absent default claimant.
    ///
    /// Returns the number of claims abandoned.
    ///
    /// # Errors
    ///
    /// Returns a lookup or persistence error; no partial mutation occurs
    /// for the entity being processed when one is returned.
    pub async fn abandon_stale_default_claims(&self) -> ClaimLedgerResult<usize> {
        let today = self.clock.utc().date_naive();
        let from = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let to = today.checked_add_days(Days::new(2)).unwrap_or(today);

        let mut abandoned = 0_usize;
        for task in self.tasks.scheduled_between(from, to).await? {
            abandoned += self.abandon_for_task(&task).await?;
        }
        info!(abandoned, "stale default claims abandoned");
        Ok(abandoned)
    }

    async fn abandon_for_task(&self, task: &Task) -> ClaimLedgerResult<usize> {
        let Some(template_id) = task.template() else {
            return Ok(0);
        };
        let Some(template) = self.templates.find_by_id(template_id).await? else {
            return Ok(0);
        };
        let Some(default_claimant) = template.default_claimant() else {
            return Ok(0);
        };

        let mut abandoned = 0_usize;
        for claim in self.claims.current_claims_for_task(task.id()).await? {
            if claim.member() != default_claimant || claim.is_verified() {
                continue;
            }
            // The task owner may have forgotten to make the default
            // claimant individually eligible; fix that before reopening
            // the task to the pool.
            let mut relisted = task.clone();
            if relisted.ensure_eligible_claimant(default_claimant) {
                self.tasks.update(&relisted).await?;
            }
            self.claims.delete(claim.id()).await?;
            abandoned += 1;
        }
        Ok(abandoned)
    }

    async fn require_task(&self, id: TaskId) -> ClaimLedgerResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(ClaimLedgerError::TaskNotFound(id))
    }

    async fn require_claim(&self, id: ClaimId) -> ClaimLedgerResult<Claim> {
        self.claims
            .find_by_id(id)
            .await?
            .ok_or(ClaimLedgerError::ClaimNotFound(id))
    }
}
