//! Model gateway: one chat-completion call per lesson request.
//!
//! [`ModelGateway`] is the seam between the pipeline and the outside world.
//! [`ChatCompletionClient`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint (OpenRouter by default). There are no
//! retries: each request makes exactly one attempt.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "xiaomi/mimo-v2-flash:free";
pub const DEFAULT_REFERER: &str = "http://localhost:3000";
pub const APP_TITLE: &str = "PlanoReal";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Failures talking to the text-generation endpoint.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to model endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model endpoint reply has no choices[0].message.content: {body}")]
    MissingContent { body: String },

    #[error("invalid model gateway configuration: {0}")]
    Config(String),
}

/// Adapter interface for the external text-generation service.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send `prompt` as the sole user message and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;
}

// Compile-time assertion: ModelGateway must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ModelGateway) {}
};

/// Connection and sampling settings for [`ChatCompletionClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Sent as `HTTP-Referer` for OpenRouter attribution.
    pub referer: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Defaults for everything except the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
pub struct ChatCompletionClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl ChatCompletionClient {
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::Config("API key is empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(UpstreamError::Config("model is empty".to_string()));
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn request_body(&self, prompt: &str) -> Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "user", "content": prompt },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }
}

#[async_trait]
impl ModelGateway for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let url = self.config.chat_completions_url();
        tracing::debug!(%url, model = %self.config.model, prompt_len = prompt.len(), "calling model endpoint");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", APP_TITLE)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = response.json().await?;
        reply_content(&raw)
            .map(str::to_string)
            .ok_or_else(|| UpstreamError::MissingContent {
                body: raw.to_string(),
            })
    }
}

/// Body text of a failed reply, or a note saying why it could not be read.
fn error_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}

/// Pull `choices[0].message.content` out of a chat-completion reply.
pub fn reply_content(raw: &Value) -> Option<&str> {
    raw.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}
