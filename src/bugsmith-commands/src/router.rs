//! Message-to-reply routing.

use bugsmith_llm::LlmClient;
use bugsmith_ratelimits::RateLimiter;
use bugsmith_settings::{ChannelId, SettingsService, TeamId};
use tracing::warn;

use crate::dispatch::{Command, match_command};
use crate::handlers::{bug_report, general, jira, project};

/// Shown once per channel, the first time the bot replies there.
const WELCOME_HINT: &str =
    "👋 Hi! I turn messages into structured bug reports and answer project \
     questions. Type `help` to see everything I can do.";

/// Routes one inbound message to its handler and formats the reply.
///
/// Holds the injected collaborators; cheap to clone, no per-request state.
#[derive(Clone)]
pub struct CommandRouter {
    settings: SettingsService,
    limiter: RateLimiter,
    llm: Option<LlmClient>,
}

impl CommandRouter {
    pub fn new(settings: SettingsService, limiter: RateLimiter, llm: Option<LlmClient>) -> Self {
        Self {
            settings,
            limiter,
            llm,
        }
    }

    /// Handle one message and produce the textual reply.
    ///
    /// `channel_id` is absent in direct-message context; project-scoped
    /// commands then run against the implicit `default` project.
    pub async fn handle_message(
        &self,
        text: &str,
        team_id: &str,
        channel_id: Option<&str>,
    ) -> String {
        let team = match TeamId::parse(team_id) {
            Ok(team) => team,
            Err(err) => {
                warn!(%err, "rejecting message with invalid team id");
                return "Sorry, I couldn't identify your workspace. Please try again.".to_string();
            }
        };
        let channel = match channel_id.map(ChannelId::parse).transpose() {
            Ok(channel) => channel,
            Err(err) => {
                warn!(%err, "rejecting message with invalid channel id");
                return "Sorry, I couldn't identify this channel. Please try again.".to_string();
            }
        };

        self.settings.record_invocation(&team).await;

        let reply = self
            .run_command(match_command(text), text, &team, channel.as_ref())
            .await;

        // First reply in a channel gets the onboarding hint prepended. The
        // flag write is auxiliary; losing it just repeats the hint once.
        if let Some(channel) = channel.as_ref()
            && !self.settings.welcome_shown(&team, channel).await
        {
            self.settings.set_welcome_shown(&team, channel, true).await;
            return format!("{WELCOME_HINT}\n\n{reply}");
        }

        reply
    }

    async fn run_command(
        &self,
        command: Command,
        text: &str,
        team: &TeamId,
        channel: Option<&ChannelId>,
    ) -> String {
        let settings = &self.settings;

        match command {
            Command::UseProject => project::use_project(settings, text, team, channel).await,
            Command::ListProjects => project::list_projects(settings, team).await,
            Command::Status => project::status(settings, team, channel).await,
            Command::ShowBugTemplate => {
                bug_report::show_bug_template(settings, team, channel).await
            }
            Command::EditBugTemplate => {
                bug_report::edit_bug_template(settings, text, team, channel).await
            }
            Command::CreateBugReport => {
                bug_report::create_bug_report(
                    settings,
                    &self.limiter,
                    self.llm.as_ref(),
                    text,
                    team,
                    channel,
                )
                .await
            }
            Command::ShowProject => bug_report::show_project_docs(settings, team, channel).await,
            Command::UpdateDocs => bug_report::update_docs(settings, text, team, channel).await,
            Command::EnableDocs => bug_report::set_use_docs(settings, true, team, channel).await,
            Command::DisableDocs => bug_report::set_use_docs(settings, false, team, channel).await,
            Command::SetJiraToken => jira::set_token(settings, text, team, channel).await,
            Command::SetJiraUrl => jira::set_url(settings, text, team, channel).await,
            Command::SetJiraEmail => jira::set_email(settings, text, team, channel).await,
            Command::SetJiraQuery => jira::set_query(settings, text, team, channel).await,
            Command::ShowJiraQuery => jira::show_query(settings, team, channel).await,
            Command::SetJiraDefaults => jira::set_defaults(settings, text, team, channel).await,
            Command::ShowJiraDefaults => jira::show_defaults(settings, team, channel).await,
            Command::ClearJiraDefault => jira::clear_default(settings, text, team, channel).await,
            Command::TestJira => jira::test_connection(settings, team, channel).await,
            Command::GetBugs => jira::get_bugs(settings, team, channel).await,
            Command::Help => general::help(),
            Command::Unknown => general::unknown(),
        }
    }
}
