//! Rendering of the three outbound email bodies.
//!
//! Bodies are rendered from embedded `minijinja` templates into
//! text/HTML pairs; subject lines are composed by the calling service.

use crate::scheduling::domain::Task;
use minijinja::{Environment, context};
use serde::Serialize;
use thiserror::Error;

/// Error returned when a template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {template}: {reason}")]
pub struct RenderError {
    /// Name of the template that failed.
    pub template: &'static str,
    /// Renderer diagnostic.
    pub reason: String,
}

/// Task fields exposed to email templates.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    /// Short description of the task.
    pub short_desc: String,
    /// Scheduled date, ISO formatted, or `-` for undated tasks.
    pub scheduled_date: String,
    /// Weekday name of the scheduled date, or `-` for undated tasks.
    pub weekday: String,
}

impl TaskSummary {
    /// Builds the template view of a task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        let scheduled_date = task
            .scheduled_date()
            .map_or_else(|| "-".to_owned(), |date| date.format("%Y-%m-%d").to_string());
        let weekday = task
            .scheduled_date()
            .map_or_else(|| "-".to_owned(), |date| date.format("%A").to_string());
        Self {
            short_desc: task.descriptor().short_desc.clone(),
            scheduled_date,
            weekday,
        }
    }
}

/// Tagging fields exposed to the report template.
#[derive(Debug, Clone, Serialize)]
pub struct TaggingSummary {
    /// Name of the member that was tagged.
    pub member: String,
    /// Name of the granted tag.
    pub tag: String,
}

const CALL_FOR_VOLUNTEERS_TEXT: &str = "\
Hi {{ friendly_name }},

The following upcoming tasks still need workers:
{% for task in tasks %}
  * {{ task.short_desc }} on {{ task.weekday }} {{ task.scheduled_date }}
{%- endfor %}

If you can help, please claim a task here:
{{ host }}/tasks/offer/{{ token }}/

Thanks for volunteering!
";

const CALL_FOR_VOLUNTEERS_HTML: &str = "\
<p>Hi {{ friendly_name }},</p>
<p>The following upcoming tasks still need workers:</p>
<ul>
{% for task in tasks %}  <li>{{ task.short_desc }} on {{ task.weekday }} {{ task.scheduled_date }}</li>
{% endfor %}</ul>
<p>If you can help, please <a href=\"{{ host }}/tasks/offer/{{ token }}/\">claim a task</a>.</p>
<p>Thanks for volunteering!</p>
";

const CLAIM_VERIFICATION_TEXT: &str = "\
Hi {{ friendly_name }},

You are signed up for \"{{ task.short_desc }}\" on {{ task.weekday }} {{ task.scheduled_date }}.

Please confirm that you are still available:
{{ host }}/tasks/verify/{{ token }}/

If we don't hear from you, the task will be opened up to other volunteers.
";

const CLAIM_VERIFICATION_HTML: &str = "\
<p>Hi {{ friendly_name }},</p>
<p>You are signed up for <b>{{ task.short_desc }}</b> on {{ task.weekday }} {{ task.scheduled_date }}.</p>
<p>Please <a href=\"{{ host }}/tasks/verify/{{ token }}/\">confirm that you are still available</a>.</p>
<p>If we don't hear from you, the task will be opened up to other volunteers.</p>
";

const TAGGINGS_REPORT_TEXT: &str = "\
Hi {{ friendly_name }},

These taggings you authorized were recorded yesterday:
{% for tagging in taggings %}
  * {{ tagging.member }}: {{ tagging.tag }}
{%- endfor %}
";

const TAGGINGS_REPORT_HTML: &str = "\
<p>Hi {{ friendly_name }},</p>
<p>These taggings you authorized were recorded yesterday:</p>
<ul>
{% for tagging in taggings %}  <li>{{ tagging.member }}: {{ tagging.tag }}</li>
{% endfor %}</ul>
";

fn render(
    template_name: &'static str,
    template: &str,
    context: impl Serialize,
) -> Result<String, RenderError> {
    let environment = Environment::new();
    environment
        .render_str(template, context)
        .map_err(|error| RenderError {
            template: template_name,
            reason: error.to_string(),
        })
}

/// Renders the call-for-volunteers body pair (text, HTML).
///
/// # Errors
///
/// Returns [`RenderError`] when a template fails to render.
pub fn render_call_for_volunteers(
    friendly_name: &str,
    tasks: &[TaskSummary],
    token: &str,
    host: &str,
) -> Result<(String, String), RenderError> {
    let text = render(
        "call_for_volunteers.txt",
        CALL_FOR_VOLUNTEERS_TEXT,
        context! { friendly_name, tasks, token, host },
    )?;
    let html = render(
        "call_for_volunteers.html",
        CALL_FOR_VOLUNTEERS_HTML,
        context! { friendly_name, tasks, token, host },
    )?;
    Ok((text, html))
}

/// Renders the claim-verification body pair (text, HTML).
///
/// # Errors
///
/// Returns [`RenderError`] when a template fails to render.
pub fn render_claim_verification(
    friendly_name: &str,
    task: &TaskSummary,
    token: &str,
    host: &str,
) -> Result<(String, String), RenderError> {
    let text = render(
        "claim_verification.txt",
        CLAIM_VERIFICATION_TEXT,
        context! { friendly_name, task, token, host },
    )?;
    let html = render(
        "claim_verification.html",
        CLAIM_VERIFICATION_HTML,
        context! { friendly_name, task, token, host },
    )?;
    Ok((text, html))
}

/// Renders the new-taggings report body pair (text, HTML).
///
/// # Errors
///
/// Returns [`RenderError`] when a template fails to render.
pub fn render_taggings_report(
    friendly_name: &str,
    taggings: &[TaggingSummary],
) -> Result<(String, String), RenderError> {
    let text = render(
        "taggings_report.txt",
        TAGGINGS_REPORT_TEXT,
        context! { friendly_name, taggings },
    )?;
    let html = render(
        "taggings_report.html",
        TAGGINGS_REPORT_HTML,
        context! { friendly_name, taggings },
    )?;
    Ok((text, html))
}
