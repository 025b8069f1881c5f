//! Slack Web API client.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{SlackError, SlackResult};

/// Default Web API root.
const SLACK_API_URL: &str = "https://slack.com/api";

/// Timeout for Web API calls.
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal Web API client: posts replies into channels.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: SecretString,
}

impl SlackClient {
    pub fn new(bot_token: impl Into<String>) -> SlackResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| SlackError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: SLACK_API_URL.to_string(),
            bot_token: SecretString::from(bot_token.into()),
        })
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Post a message, optionally into a thread.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> SlackResult<()> {
        let mut payload = serde_json::json!({
            "channel": channel,
            "text": text,
        });
        if let Some(ts) = thread_ts {
            payload["thread_ts"] = serde_json::Value::String(ts.to_string());
        }

        let response: serde_json::Value = self.api_call("chat.postMessage", &payload).await?;

        if response.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let error = response
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown");
            return Err(SlackError::Api(format!("chat.postMessage failed: {error}")));
        }

        debug!(channel, "posted message");
        Ok(())
    }

    async fn api_call(
        &self,
        method: &str,
        payload: &serde_json::Value,
    ) -> SlackResult<serde_json::Value> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bot_token.expose_secret())
            .json(payload)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}
