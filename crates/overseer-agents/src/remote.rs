//! Remote language-model agent.
//!
//! [`RemoteAgent`] wraps any [`ModelBackend`] with a bounded timeout and turns
//! every failure into an answer string. [`GeminiBackend`] talks to the Google
//! generative language REST API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapter::Agent;
use crate::error::{clip, BackendError};

/// Default base URL of the generative language API.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A language model reachable over some transport.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn call(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Agent that delegates to a [`ModelBackend`].
pub struct RemoteAgent {
    name: String,
    backend: Arc<dyn ModelBackend>,
    timeout: Duration,
}

impl RemoteAgent {
    /// Agent reporting as `name`; each call to `backend` is bounded by
    /// `timeout`.
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn ModelBackend>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            timeout,
        }
    }
}

#[async_trait]
impl Agent for RemoteAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, prompt: &str) -> String {
        let call = tokio::time::timeout(self.timeout, self.backend.call(prompt));
        let outcome = match call.await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };
        match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!(agent = %self.name, error = %e, "remote agent call failed");
                format!("Remote agent error: {e}")
            }
        }
    }
}

/// Connection settings for [`GeminiBackend`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Public endpoint with a 10 s request timeout.
    pub fn new(model: &str, api_key: &str) -> Self {
        GeminiConfig {
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the base URL; a trailing slash is dropped.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// `generateContent` client for Gemini models.
pub struct GeminiBackend {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiBackend {
    /// Fails with [`BackendError::NotConfigured`] when the API key is empty.
    pub fn new(config: GeminiConfig) -> Result<Self, BackendError> {
        if config.api_key.is_empty() {
            return Err(BackendError::NotConfigured("missing API key".to_string()));
        }
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("overseer/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(GeminiBackend {
            config,
            http_client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn call(&self, prompt: &str) -> Result<String, BackendError> {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };
        debug!(model = %self.config.model, "calling generateContent");

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: clip(&body, 200),
            });
        }

        let decoded: GenerateResponse = response.json().await?;
        let text: String = decoded
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}
