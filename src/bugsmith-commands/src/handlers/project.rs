//! Project and channel management commands.

use bugsmith_settings::{ChannelId, ProjectName, SettingsService, TeamId};
use tracing::debug;

use crate::dispatch::strip_command;
use crate::errors::storage_error_message;

/// `use project <name>` - bind this channel to a named project
/// configuration, creating it with defaults if it does not exist yet.
pub async fn use_project(
    settings: &SettingsService,
    text: &str,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    let Some(channel) = channel else {
        return "Projects are bound per channel. Please run `use project <name>` \
                inside the channel you want to configure."
            .to_string();
    };

    let raw_name = strip_command(text, "use project");
    if raw_name.is_empty() {
        return "Please provide a project name. Example:\n`use project Mobile app`".to_string();
    }

    let project = match ProjectName::parse(&raw_name) {
        Ok(name) => name,
        Err(err) => return format!("Invalid project name: {}", err.reason),
    };

    match settings.bind_channel_project(team, channel, &project).await {
        Ok(()) => format!("Channel is now using project configuration *{project}*."),
        Err(err) => storage_error_message(&err, "use_project"),
    }
}

/// `list projects` - enumerate known project configurations.
pub async fn list_projects(settings: &SettingsService, team: &TeamId) -> String {
    match settings.list_projects(team).await {
        Ok(projects) if projects.is_empty() => "No project configurations found yet.\n\
             You can create one by mentioning me and saying, for example:\n\
             `use project Mobile app`"
            .to_string(),
        Ok(projects) => {
            let mut lines = vec!["Available project configurations:".to_string()];
            lines.extend(projects.into_iter().map(|name| format!("- {name}")));
            lines.join("\n")
        }
        Err(err) => storage_error_message(&err, "list_projects"),
    }
}

/// `status` - current channel binding and project configuration summary.
pub async fn status(
    settings: &SettingsService,
    team: &TeamId,
    channel: Option<&ChannelId>,
) -> String {
    let Some(channel) = channel else {
        return "Channel status is only available when called from a channel.".to_string();
    };

    debug!(team = %team, channel = %channel, "rendering channel status");

    let project_name = settings.channel_project_name(team, channel).await;
    let resolved = match settings.resolve_settings(team, Some(channel)).await {
        Ok(resolved) => resolved,
        Err(err) => return storage_error_message(&err, "status"),
    };

    let or_na = |value: &str| {
        if value.trim().is_empty() {
            "N/A".to_string()
        } else {
            value.trim().to_string()
        }
    };

    let mut lines = vec![
        format!(
            "*Project name:* {}",
            project_name.as_deref().unwrap_or("N/A")
        ),
        format!("*Project context:* {}", or_na(&resolved.project_context)),
        format!("*Use project context:* {}", resolved.use_project_context),
        format!("*Jira URL:* {}", or_na(&resolved.jira_url)),
        format!(
            "*Jira token:* {}",
            if resolved.jira_token.trim().is_empty() {
                "not set"
            } else {
                "set"
            }
        ),
        format!("*Jira email:* {}", or_na(&resolved.jira_email)),
    ];

    if resolved.jira_defaults.is_empty() {
        lines.push("*Jira defaults:* none".to_string());
    } else {
        let defaults = resolved
            .jira_defaults
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("*Jira defaults:* {defaults}"));
    }

    lines.join("\n")
}
