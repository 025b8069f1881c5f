//! Jira REST client.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{JiraError, JiraResult};
use crate::models::{CurrentUser, Issue, SearchResults};

/// Client for a single Jira instance, authenticated with email + API token.
#[derive(Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    token: SecretString,
}

impl JiraClient {
    /// Build a client for the given instance. `timeout` applies to every
    /// request; a timeout is reported as [`JiraError::Timeout`], distinct
    /// from other failures.
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> JiraResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JiraError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            token: SecretString::from(token.into()),
        })
    }

    /// The instance base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Browse URL for an issue key.
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    /// Identity of the authenticated user; the cheapest full round-trip for
    /// verifying credentials.
    pub async fn current_user(&self) -> JiraResult<String> {
        let url = format!("{}/rest/api/2/myself", self.base_url);
        debug!(%url, "fetching Jira identity");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(self.token.expose_secret()))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let user: CurrentUser = response.json().await?;
        user.identity()
            .map(str::to_string)
            .ok_or_else(|| JiraError::InvalidResponse("no identity fields in response".to_string()))
    }

    /// Search issues by JQL, capped at `max_results`.
    pub async fn search_issues(&self, jql: &str, max_results: u32) -> JiraResult<Vec<Issue>> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        debug!(%url, max_results, "searching Jira issues");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(self.token.expose_secret()))
            .query(&[
                ("jql", jql),
                ("maxResults", &max_results.to_string()),
                ("fields", "summary,status,issuetype"),
            ])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let results: SearchResults = response.json().await?;
        Ok(results.issues.into_iter().map(Issue::from).collect())
    }

    /// Map error statuses to their variants; 401/403/400 each carry distinct
    /// user guidance downstream.
    async fn check_status(response: reqwest::Response) -> JiraResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => JiraError::Unauthorized,
            StatusCode::FORBIDDEN => JiraError::Forbidden,
            StatusCode::BAD_REQUEST => JiraError::BadRequest(error_detail(&body)),
            _ => JiraError::Api(format!("{status}: {}", error_detail(&body))),
        })
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Pull `errorMessages` out of a Jira error body, falling back to the raw
/// (truncated) text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(messages) = value.get("errorMessages").and_then(|m| m.as_array())
    {
        let joined: Vec<&str> = messages.iter().filter_map(|m| m.as_str()).collect();
        if !joined.is_empty() {
            return joined.join("; ");
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no detail provided".to_string()
    } else if trimmed.len() > 200 {
        format!("{}...", &trimmed[..200])
    } else {
        trimmed.to_string()
    }
}
