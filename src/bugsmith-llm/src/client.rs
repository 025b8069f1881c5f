//! Generative-text backend client.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::models::{ChatMessage, ChatRequest, ChatResponse};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for bug report drafting.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default request timeout. The platform boundary has its own tight response
/// budget, so a slow backend must fail distinctly rather than hang.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the generative backend.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for the chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Send one prompt and return the generated text, trimmed.
    pub async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, "requesting completion");
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{status}: {}", body.trim())));
        }

        let completion: ChatResponse = response.json().await?;
        completion.first_content().ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> LlmClient {
        LlmClient::new(LlmConfig::new("test-key").with_base_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_trimmed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "  Bug name: login broken  "}
                }]
            })))
            .mount(&server)
            .await;

        let text = client(&server).complete("prompt").await.unwrap();
        assert_eq!(text, "Bug name: login broken");
    }

    #[tokio::test]
    async fn test_empty_content_is_its_own_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "   "}}]
            })))
            .mount(&server)
            .await;

        let err = client(&server).complete("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_api_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = client(&server).complete("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Api(_)));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_variant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(300))
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let mut config = LlmConfig::new("test-key").with_base_url(server.uri());
        config.timeout = Duration::from_millis(50);
        let err = LlmClient::new(config)
            .unwrap()
            .complete("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
    }
}
