//! Jira configuration and operations commands.

use std::collections::BTreeMap;

use bugsmith_jira::{JiraClient, JiraError};
use bugsmith_settings::{ChannelId, ProjectField, ProjectSettings, SettingsService, TeamId};
use bugsmith_slack::text::{clean_invisible, unwrap_link};
use tracing::error;

use crate::dispatch::strip_command;
use crate::errors::storage_error_message;
use crate::limits::{
    JIRA_CLIENT_TIMEOUT, MAX_JIRA_EMAIL_LENGTH, MAX_JIRA_FIELD_NAME_LENGTH,
    MAX_JIRA_FIELD_VALUE_LENGTH, MAX_JIRA_ISSUES_LIMIT, MAX_JIRA_QUERY_LENGTH,
    MAX_JIRA_TOKEN_LENGTH, MAX_JIRA_URL_LENGTH, MIN_JIRA_QUERY_LENGTH, MIN_JIRA_TOKEN_LENGTH,
};

/// `set jira token <token>`
pub async fn set_token(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let token = strip_command(text, "set jira token");

    if token.is_empty() {
        return "Please provide a Jira token. Example: `set jira token <your-token>`".to_string();
    }
    if token.len() < MIN_JIRA_TOKEN_LENGTH {
        return "Jira token looks too short. Please send a valid token.".to_string();
    }
    if token.len() > MAX_JIRA_TOKEN_LENGTH {
        return format!(
            "Jira token looks unusually long. Please ensure it's correct and shorter \
             than {MAX_JIRA_TOKEN_LENGTH} characters."
        );
    }

    match settings
        .update_field(team, channel, ProjectField::JiraToken(token))
        .await
    {
        Ok(()) => "Jira token has been updated.".to_string(),
        Err(err) => storage_error_message(&err, "set_jira_token"),
    }
}

/// `set jira url <url>`
pub async fn set_url(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    // Slack renders pasted URLs as `<url|label>`; unwrap before validating.
    let raw = strip_command(text, "set jira url");
    let url = clean_invisible(unwrap_link(&raw));

    if url.is_empty() {
        return "Please provide a Jira URL. Example: \
                `set jira url https://your-instance.atlassian.net`"
            .to_string();
    }

    let lowered = url.to_lowercase();
    if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
        let preview: String = url.chars().take(60).collect();
        return format!("Jira URL should start with http:// or https://. Got: {preview:?}");
    }

    if url.len() > MAX_JIRA_URL_LENGTH {
        return format!(
            "Jira URL is too long. Please provide a URL shorter than \
             {MAX_JIRA_URL_LENGTH} characters."
        );
    }

    match settings
        .update_field(team, channel, ProjectField::JiraUrl(url))
        .await
    {
        Ok(()) => "Jira URL has been updated.".to_string(),
        Err(err) => storage_error_message(&err, "set_jira_url"),
    }
}

/// `set jira email <email>`
pub async fn set_email(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let email = strip_command(text, "set jira email");

    if email.is_empty() {
        return "Please provide a Jira email address. Example: \
                `set jira email user@example.com`"
            .to_string();
    }

    let domain_has_dot = email
        .rsplit_once('@')
        .map(|(_, domain)| domain.contains('.'))
        .unwrap_or(false);
    if !domain_has_dot {
        return "Please provide a valid email address.".to_string();
    }

    if email.len() > MAX_JIRA_EMAIL_LENGTH {
        return format!(
            "Jira email is too long. Please provide an email shorter than \
             {MAX_JIRA_EMAIL_LENGTH} characters."
        );
    }

    match settings
        .update_field(team, channel, ProjectField::JiraEmail(email))
        .await
    {
        Ok(()) => "Jira email has been updated.".to_string(),
        Err(err) => storage_error_message(&err, "set_jira_email"),
    }
}

/// `set jira query <JQL>`
pub async fn set_query(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let query = strip_command(text, "set jira query");

    if query.is_empty() {
        return "Please provide a JQL query. Example: \
                `set jira query project = PROJ AND status != Done`"
            .to_string();
    }
    if query.len() < MIN_JIRA_QUERY_LENGTH {
        return "Jira query looks too short. Please provide a valid JQL query.".to_string();
    }
    if query.len() > MAX_JIRA_QUERY_LENGTH {
        return format!(
            "Jira query is too long. Please shorten it to under \
             {MAX_JIRA_QUERY_LENGTH} characters."
        );
    }

    match settings
        .update_field(team, channel, ProjectField::JiraBugQuery(query))
        .await
    {
        Ok(()) => "Jira bug query has been updated.".to_string(),
        Err(err) => storage_error_message(&err, "set_jira_query"),
    }
}

/// `show jira query`
pub async fn show_query(
    settings: &SettingsService,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    match settings.resolve_settings(team, channel).await {
        Ok(resolved) => {
            if resolved.jira_bug_query.trim().is_empty() {
                "Jira bug query is not set.".to_string()
            } else {
                format!("Current Jira bug query:\n```\n{}\n```", resolved.jira_bug_query)
            }
        }
        Err(err) => storage_error_message(&err, "show_jira_query"),
    }
}

/// `set jira defaults field=value [field=value ...]` - merge default field
/// values used when creating tracker issues.
pub async fn set_defaults(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let payload = strip_command(text, "set jira defaults");
    if payload.is_empty() {
        return "Please provide field=value pairs.\n\
                Example: `set jira defaults project=PROJ-123 type=Bug priority=High`\n\
                For a single field: `set jira defaults project=PROJ-123`"
            .to_string();
    }

    let mut parsed = BTreeMap::new();
    let mut errors = Vec::new();

    for pair in payload.split_whitespace() {
        let Some((name, value)) = pair.split_once('=') else {
            errors.push(format!("Invalid format: '{pair}' (expected field=value)"));
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.is_empty() {
            errors.push(format!("Empty field name in: '{pair}'"));
            continue;
        }
        if value.is_empty() {
            errors.push(format!("Empty field value in: '{pair}'"));
            continue;
        }
        if name.len() > MAX_JIRA_FIELD_NAME_LENGTH {
            errors.push(format!(
                "Field name too long: '{name}' (max {MAX_JIRA_FIELD_NAME_LENGTH} characters)"
            ));
            continue;
        }
        if value.len() > MAX_JIRA_FIELD_VALUE_LENGTH {
            errors.push(format!(
                "Field value too long: '{value}' (max {MAX_JIRA_FIELD_VALUE_LENGTH} characters)"
            ));
            continue;
        }

        parsed.insert(name.to_string(), value.to_string());
    }

    if !errors.is_empty() {
        let mut lines = vec!["Errors found:".to_string()];
        lines.extend(errors.into_iter().map(|e| format!("- {e}")));
        return lines.join("\n");
    }
    if parsed.is_empty() {
        return "No valid field=value pairs found.".to_string();
    }

    let resolved = match settings.resolve_settings(team, channel).await {
        Ok(resolved) => resolved,
        Err(err) => return storage_error_message(&err, "set_jira_defaults"),
    };

    let mut merged = resolved.jira_defaults;
    merged.extend(parsed.clone());

    match settings
        .update_field(team, channel, ProjectField::JiraDefaults(merged))
        .await
    {
        Ok(()) => {
            let fields = parsed
                .iter()
                .map(|(k, v)| format!("*{k}*={v}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Jira defaults updated: {fields}.")
        }
        Err(err) => storage_error_message(&err, "set_jira_defaults"),
    }
}

/// `show jira defaults`
pub async fn show_defaults(
    settings: &SettingsService,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    match settings.resolve_settings(team, channel).await {
        Ok(resolved) => {
            if resolved.jira_defaults.is_empty() {
                return "No Jira default fields are set.\n\
                        Use `set jira defaults field=value` to set fields.\n\
                        Example: `set jira defaults project=PROJ-123 type=Bug`"
                    .to_string();
            }
            let mut lines = vec!["*Jira default fields:*".to_string()];
            for (name, value) in &resolved.jira_defaults {
                lines.push(format!("  • *{name}*: {value}"));
            }
            lines.join("\n")
        }
        Err(err) => storage_error_message(&err, "show_jira_defaults"),
    }
}

/// `clear jira default <field>`
pub async fn clear_default(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let field_name = strip_command(text, "clear jira default");
    if field_name.is_empty() {
        return "Please provide a field name to clear.\nExample: `clear jira default project`"
            .to_string();
    }
    if field_name.len() > MAX_JIRA_FIELD_NAME_LENGTH {
        return format!("Field name is too long (max {MAX_JIRA_FIELD_NAME_LENGTH} characters).");
    }

    let resolved = match settings.resolve_settings(team, channel).await {
        Ok(resolved) => resolved,
        Err(err) => return storage_error_message(&err, "clear_jira_default"),
    };

    let mut defaults = resolved.jira_defaults;
    if defaults.remove(&field_name).is_none() {
        return format!("Jira default field *{field_name}* is not set.");
    }

    match settings
        .update_field(team, channel, ProjectField::JiraDefaults(defaults))
        .await
    {
        Ok(()) => format!("Jira default field *{field_name}* has been cleared."),
        Err(err) => storage_error_message(&err, "clear_jira_default"),
    }
}

/// Build a client from the resolved settings, or explain what is missing.
fn client_from_settings(resolved: &ProjectSettings) -> Result<JiraClient, String> {
    let url = resolved.jira_url.trim();
    let token = resolved.jira_token.trim();
    let email = resolved.jira_email.trim();

    let mut missing = Vec::new();
    if url.is_empty() {
        missing.push("Jira URL");
    }
    if token.is_empty() {
        missing.push("Jira token");
    }
    if email.is_empty() {
        missing.push("Jira email");
    }

    if !missing.is_empty() {
        return Err(format!(
            "Jira is not fully configured. Missing: {}.\n\
             Please set these using:\n\
             - `set jira url <url>`\n\
             - `set jira token <token>`\n\
             - `set jira email <email>`",
            missing.join(", ")
        ));
    }

    JiraClient::new(url, email, token, JIRA_CLIENT_TIMEOUT)
        .map_err(|err| format!("Failed to connect to Jira: {err}"))
}

fn auth_failure_message(err: &JiraError) -> Option<&'static str> {
    match err {
        JiraError::Unauthorized => {
            Some("❌ Authentication failed. Please check your Jira email and token.")
        }
        JiraError::Forbidden => Some("❌ Access forbidden. Please check your Jira permissions."),
        _ => None,
    }
}

/// `test jira` - verify connectivity and credentials for the current project.
pub async fn test_connection(
    settings: &SettingsService,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let resolved = match settings.resolve_settings(team, channel).await {
        Ok(resolved) => resolved,
        Err(err) => return storage_error_message(&err, "test_jira"),
    };
    let client = match client_from_settings(&resolved) {
        Ok(client) => client,
        Err(message) => return message,
    };

    match client.current_user().await {
        Ok(identity) => format!("✅ Jira connection successful!\nConnected as: *{identity}*"),
        Err(err) => {
            error!(team = %team, %err, "Jira connection test failed");
            if let Some(message) = auth_failure_message(&err) {
                return message.to_string();
            }
            format!("❌ Jira connection test failed: {err}")
        }
    }
}

/// `get bugs` - run the project's JQL query and list matching issues.
pub async fn get_bugs(
    settings: &SettingsService,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    if let Some(message) = settings.require_project_bound(team, channel).await {
        return message;
    }

    let resolved = match settings.resolve_settings(team, channel).await {
        Ok(resolved) => resolved,
        Err(err) => return storage_error_message(&err, "get_bugs"),
    };
    let client = match client_from_settings(&resolved) {
        Ok(client) => client,
        Err(message) => return message,
    };

    let jql = resolved.jira_bug_query.trim();
    if jql.is_empty() {
        return "Jira bug query (JQL) is not set for this project.\n\
                Please set it using: `set jira query <JQL query>`\n\
                Example: `set jira query project = PROJ AND status != Done`"
            .to_string();
    }

    let issues = match client.search_issues(jql, MAX_JIRA_ISSUES_LIMIT).await {
        Ok(issues) => issues,
        Err(err) => {
            error!(team = %team, %err, "Jira search failed");
            if let Some(message) = auth_failure_message(&err) {
                return message.to_string();
            }
            if let JiraError::BadRequest(detail) = &err {
                return format!(
                    "❌ Invalid JQL query:\n```{jql}```\n\
                     Error: {detail}\n\
                     Please check your query syntax and try again."
                );
            }
            return format!("❌ Failed to fetch issues: {err}");
        }
    };

    if issues.is_empty() {
        return format!("No issues found matching the query:\n```{jql}```");
    }

    let mut lines = vec![format!(
        "Found *{}* issue(s) (showing up to {MAX_JIRA_ISSUES_LIMIT}):\n",
        issues.len()
    )];
    for issue in &issues {
        lines.push(format!("• *{}*: {}", issue.key, issue.summary));
        lines.push(format!(
            "  Type: {} | Status: {}",
            issue.issue_type, issue.status
        ));
        lines.push(format!("  <{}|View in Jira>", client.browse_url(&issue.key)));
        lines.push(String::new());
    }
    if issues.len() == MAX_JIRA_ISSUES_LIMIT as usize {
        lines.push(format!(
            "\n_Note: Showing first {MAX_JIRA_ISSUES_LIMIT} issues. There may be more._"
        ));
    }

    lines.join("\n")
}
