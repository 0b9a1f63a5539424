//! Outbound notification port.
//!
//! Message rendering happens inside the engine; this port only carries
//! finished subject/text/html content to whatever transport the adapter
//! wraps. The planner treats a send as fire-and-forget: a failure for one
//! recipient is logged and skipped, never retried within the run, and any
//! per-recipient timeout is the adapter's responsibility.

use crate::directory::domain::EmailAddress;
use async_trait::async_trait;
use thiserror::Error;

/// A fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// The recipient.
    pub to: EmailAddress,
    /// The subject line.
    pub subject: String,
    /// The plain-text body.
    pub text_body: String,
    /// The HTML alternative body.
    pub html_body: String,
    /// An optional blind-copy recipient.
    pub bcc: Option<EmailAddress>,
}

/// Transient delivery failure reported by a notifier adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotifierError(pub String);

/// Outbound delivery contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one email.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the transport rejects or times out;
    /// the caller isolates the failure per recipient.
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifierError>;
}
