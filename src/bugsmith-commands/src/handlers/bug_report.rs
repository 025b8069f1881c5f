//! Bug report generation, template and documentation commands.

use bugsmith_llm::{LlmClient, LlmError};
use bugsmith_ratelimits::{RateLimitDecision, RateLimiter};
use bugsmith_settings::{ChannelId, ProjectField, ProjectSettings, SettingsService, TeamId};
use tracing::{debug, error, warn};

use crate::dispatch::strip_command;
use crate::errors::storage_error_message;
use crate::limits::MAX_BUG_REPORT_INPUT_LENGTH;

/// `create bug report <text>` - turn a free-text message into a structured
/// bug report via the AI backend. Gated on a bound project and the per-tenant
/// rate limit.
pub async fn create_bug_report(
    settings: &SettingsService,
    limiter: &RateLimiter,
    llm: Option<&LlmClient>,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let Some(llm) = llm else {
        return "Bug report generation is temporarily unavailable: \
                the AI API key is not configured."
            .to_string();
    };

    if let RateLimitDecision::Denied { message } = limiter.check(team).await {
        return message;
    }

    let payload = strip_command(text, "create bug report");
    if payload.len() > MAX_BUG_REPORT_INPUT_LENGTH {
        warn!(team = %team, len = payload.len(), "bug report input too long");
        return format!(
            "Your message is too long for bug report generation. \
             Please shorten it to under {MAX_BUG_REPORT_INPUT_LENGTH} characters."
        );
    }

    let resolved = match settings.resolve_settings(team, channel).await {
        Ok(resolved) => resolved,
        Err(err) => return storage_error_message(&err, "create_bug_report"),
    };

    let prompt = build_prompt(&resolved, &payload);
    debug!(team = %team, "requesting bug report draft");

    match llm.complete(&prompt).await {
        Ok(report) => report,
        Err(LlmError::Timeout) => {
            error!(team = %team, "AI timeout while generating bug report");
            "The AI service took too long to respond. \
             Please try again with a shorter message or try again later."
                .to_string()
        }
        Err(LlmError::EmptyResponse) => {
            error!(team = %team, "AI returned empty bug report");
            "I couldn't generate a bug report from this message. \
             Please try rephrasing or adding more details."
                .to_string()
        }
        Err(err) => {
            error!(team = %team, %err, "AI error while generating bug report");
            "I couldn't generate a bug report due to an internal error talking to \
             the AI service. Please try again in a bit."
                .to_string()
        }
    }
}

/// Assemble the drafting prompt: project context (only when enabled and
/// non-empty), the template verbatim, and the rules the report must follow.
fn build_prompt(settings: &ProjectSettings, user_input: &str) -> String {
    let context_block = if settings.use_project_context && !settings.project_context.trim().is_empty()
    {
        settings.project_context.as_str()
    } else {
        ""
    };

    format!(
        "Convert the user's message into a bug report.\n\
         \n\
         {context_block}\n\
         \n\
         Use the following format exactly:\n\
         {template}\n\
         \n\
         Rules:\n\
         - If project context is disabled or empty, ignore it.\n\
         - Bug name must be short (3-6 words).\n\
         - Steps must be numbered and reproducible.\n\
         - Infer details only when logically obvious.\n\
         - If the user input is too short to create a meaningful bug report, \
         respond with: \"Too short for bug report\".\n\
         - Output only the bug report in the template format.\n\
         \n\
         User input: {user_input}",
        template = settings.bug_report_template,
    )
}

/// `show bug template` - current template for this channel's project.
pub async fn show_bug_template(
    settings: &SettingsService,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    match settings.resolve_settings(team, channel).await {
        Ok(resolved) => resolved.bug_report_template,
        Err(err) => storage_error_message(&err, "show_bug_template"),
    }
}

/// `edit bug template <text>` - replace the template for this channel's
/// project.
pub async fn edit_bug_template(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let payload = strip_command(text, "edit bug template");
    if payload.is_empty() {
        return "Please provide the bug report template content.".to_string();
    }

    match settings
        .update_field(team, channel, ProjectField::BugReportTemplate(payload))
        .await
    {
        Ok(()) => "Bug report template updated".to_string(),
        Err(err) => storage_error_message(&err, "edit_bug_template"),
    }
}

/// `show project` - project documentation.
pub async fn show_project_docs(
    settings: &SettingsService,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    match settings.resolve_settings(team, channel).await {
        Ok(resolved) => {
            if resolved.project_context.trim().is_empty() {
                "Project documentation is empty. Use *update docs* to add it.".to_string()
            } else {
                resolved.project_context
            }
        }
        Err(err) => storage_error_message(&err, "show_project_docs"),
    }
}

/// `update docs <text>` - replace project documentation.
pub async fn update_docs(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let payload = strip_command(text, "update docs");
    if payload.is_empty() {
        return "Please provide project documentation content.".to_string();
    }

    match settings
        .update_field(team, channel, ProjectField::ProjectContext(payload))
        .await
    {
        Ok(()) => "Project overview updated.".to_string(),
        Err(err) => storage_error_message(&err, "update_docs"),
    }
}

/// `enable docs` / `disable docs` - toggle use of project documentation in
/// bug report prompts.
pub async fn set_use_docs(
    settings: &SettingsService,
    flag: bool,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    debug!(team = %team, flag, "toggling project documentation use");
    match settings
        .update_field(team, channel, ProjectField::UseProjectContext(flag))
        .await
    {
        Ok(()) => format!("Use documentation: {flag}"),
        Err(err) => storage_error_message(&err, "set_use_docs"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_context_only_when_enabled() {
        let mut settings = ProjectSettings {
            project_context: "Payments service docs".to_string(),
            use_project_context: false,
            ..ProjectSettings::default()
        };
        let prompt = build_prompt(&settings, "checkout is broken");
        assert!(!prompt.contains("Payments service docs"));
        assert!(prompt.contains("checkout is broken"));

        settings.use_project_context = true;
        let prompt = build_prompt(&settings, "checkout is broken");
        assert!(prompt.contains("Payments service docs"));
    }

    #[test]
    fn test_prompt_embeds_template_verbatim() {
        let settings = ProjectSettings::default();
        let prompt = build_prompt(&settings, "input");
        assert!(prompt.contains(&settings.bug_report_template));
    }
}
