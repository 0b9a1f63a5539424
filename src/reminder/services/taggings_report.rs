//! Daily report of newly authorized taggings.
//!
//! Taggings recorded yesterday are grouped by the member that authorized
//! them; each authorizer with an email address receives one report.

use crate::directory::domain::{MemberId, Tagging};
use crate::directory::ports::{DirectoryRepositoryError, MemberDirectory};
use crate::reminder::ports::{Notifier, OutboundEmail};
use crate::reminder::services::templates::{self, RenderError, TaggingSummary};
use crate::reminder::services::ReminderConfig;
use chrono::{Days, NaiveTime};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for the taggings report.
#[derive(Debug, Error)]
pub enum TaggingsReportError {
    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),

    /// Email rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Emails reports of new taggings to the members that authorized them.
#[derive(Clone)]
pub struct TaggingsReportService<D, N, C>
where
    D: MemberDirectory,
    N: Notifier,
    C: Clock + Send + Sync,
{
    directory: Arc<D>,
    notifier: Arc<N>,
    clock: Arc<C>,
    config: ReminderConfig,
}

impl<D, N, C> TaggingsReportService<D, N, C>
where
    D: MemberDirectory,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a new taggings report service.
    #[must_use]
    pub const fn new(
        directory: Arc<D>,
        notifier: Arc<N>,
        clock: Arc<C>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            directory,
            notifier,
            clock,
            config,
        }
    }

    /// Sends one report per authorizing member covering yesterday's
    /// taggings.
    ///
    /// Returns the number of reports sent.
    ///
    /// # Errors
    ///
    /// Returns a lookup or rendering error; per-recipient delivery
    /// failures are logged and skipped instead.
    pub async fn send_reports(&self) -> Result<usize, TaggingsReportError> {
        let today = self.clock.utc().date_naive();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let window_start = yesterday.and_time(NaiveTime::MIN).and_utc();
        let window_end = today.and_time(NaiveTime::MIN).and_utc();

        let mut report_lists: BTreeMap<MemberId, Vec<Tagging>> = BTreeMap::new();
        for tagging in self
            .directory
            .taggings_created_between(window_start, window_end)
            .await?
        {
            let Some(authorizer) = tagging.authorizing_member else {
                continue;
            };
            report_lists.entry(authorizer).or_default().push(tagging);
        }

        let mut sent = 0_usize;
        for (authorizer, taggings) in report_lists {
            if self.send_report(authorizer, &taggings).await? {
                sent += 1;
            }
        }
        info!(sent, "taggings reports sent");
        Ok(sent)
    }

    async fn send_report(
        &self,
        authorizer: MemberId,
        taggings: &[Tagging],
    ) -> Result<bool, TaggingsReportError> {
        let Some(member) = self.directory.find_member(authorizer).await? else {
            return Ok(false);
        };
        let Some(address) = member.email().cloned() else {
            return Ok(false);
        };

        let mut summaries = Vec::with_capacity(taggings.len());
        for tagging in taggings {
            summaries.push(self.summarize(tagging).await?);
        }

        let today = self.clock.utc().date_naive();
        let subject = format!("New Taggings Report, {}", today.format("%a %b %d"));
        let (text_body, html_body) =
            templates::render_taggings_report(member.friendly_name(), &summaries)?;
        let email = OutboundEmail {
            to: address,
            subject,
            text_body,
            html_body,
            bcc: self.config.bcc.clone(),
        };
        if let Err(err) = self.notifier.send(&email).await {
            warn!(member = %authorizer, error = %err, "taggings report delivery failed; skipping recipient");
        } else {
            info!(member = %authorizer, "sent report of authorized taggings");
        }
        Ok(true)
    }

    async fn summarize(&self, tagging: &Tagging) -> Result<TaggingSummary, TaggingsReportError> {
        let member = self
            .directory
            .find_member(tagging.member)
            .await?
            .map_or_else(|| tagging.member.to_string(), |m| m.username().to_owned());
        let tag = self
            .directory
            .find_tag(tagging.tag)
            .await?
            .map_or_else(|| tagging.tag.to_string(), |t| t.name().to_owned());
        Ok(TaggingSummary { member, tag })
    }
}
