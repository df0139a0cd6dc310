//! OpenAI-compatible HTTP client for chat completions
//!
//! Speaks the `/chat/completions` protocol used by Zhipu GLM and other
//! OpenAI-compatible services. Serializes the full request (tool catalog
//! included), performs the POST, and classifies the reply into a
//! [`ChatOutcome`].
//!
//! # Example
//!
//! ```no_run
//! use flightdesk::llm::{ChatRequest, LLMClient, OpenAICompatibleClient, Turn};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAICompatibleClient::new(
//!     "https://open.bigmodel.cn/api/paas/v4/",
//!     "Bearer your-api-key",
//! )?;
//!
//! let request = ChatRequest::new("glm-4", vec![Turn::user("你好")]);
//! let outcome = client.send(&request).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{ChatOutcome, ChatRequest, ChatResponse, ErrorEnvelope};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default request timeout for API calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Error code the service uses for a rejected credential
const AUTH_FAILURE_CODE: &str = "401";

/// OpenAI-compatible chat-completions client
///
/// The credential is attached verbatim as the `Authorization` header, so it
/// must already carry its scheme (e.g. `Bearer <key>`).
pub struct OpenAICompatibleClient {
    /// Base URL, without the `/chat/completions` suffix
    base_url: String,

    /// Value of the Authorization header
    credential: String,

    /// Shared HTTP client with connection pooling
    http_client: Client,

    /// Request timeout duration
    timeout: Duration,

    /// Where request/response traces go
    sink: Arc<dyn DiagnosticSink>,
}

impl OpenAICompatibleClient {
    /// Creates a client with the default timeout
    pub fn new(
        base_url: impl Into<String>,
        credential: impl Into<String>,
    ) -> Result<Self, BackendError> {
        Self::with_timeout(
            base_url,
            credential,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Creates a client with a custom timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        credential: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http_client = Client::builder().timeout(timeout).build().map_err(|e| {
            BackendError::ConfigurationError {
                message: format!("Failed to build HTTP client: {}", e),
            }
        })?;

        Ok(Self {
            base_url: base_url.into(),
            credential: credential.into(),
            http_client,
            timeout,
            sink: Arc::new(TracingSink),
        })
    }

    /// Replaces the diagnostic sink
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Full endpoint URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            error!("Request timed out after {:?}", self.timeout);
            BackendError::TimeoutError {
                seconds: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            error!("Cannot connect to service at {}", self.base_url);
            BackendError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else {
            error!("Service request error: {}", e);
            BackendError::NetworkError {
                message: format!("Request failed: {}", e),
            }
        }
    }
}

/// Renders a non-2xx response as user-facing text.
///
/// The body is decoded once into an [`ErrorEnvelope`]. An authentication
/// failure gets a remediation hint, 5xx statuses get a retry-later message,
/// everything else is reported as `HTTP <status>: <body>`.
pub fn describe_http_failure(status: u16, body: &str) -> String {
    let envelope = ErrorEnvelope::parse(body);
    let code = envelope
        .as_ref()
        .and_then(|e| e.code.as_ref())
        .map(|c| c.to_string());
    let message = envelope
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_default();

    let is_auth_failure = status == StatusCode::UNAUTHORIZED.as_u16()
        || code.as_deref() == Some(AUTH_FAILURE_CODE);

    if is_auth_failure {
        let code = code.unwrap_or_else(|| status.to_string());
        return format!(
            "Authentication failed (code {}): {}. Check the API key format: the credential must be sent as \"Bearer <key>\".",
            code, message
        );
    }

    if (500..600).contains(&status) {
        return format!(
            "Server error (HTTP {}): the service is temporarily unavailable, please retry later.",
            status
        );
    }

    format!("HTTP {}: {}", status, body)
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatOutcome, BackendError> {
        let url = self.completions_url();

        let body = serde_json::to_string(request).map_err(|e| BackendError::Other {
            message: format!("Failed to serialize request: {}", e),
        })?;

        self.sink
            .write_diagnostic(&format!("Sending request to: {}", url));
        self.sink.write_diagnostic(&format!("Request body: {}", body));

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat completion request"
        );

        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, self.credential.as_str())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let elapsed = start.elapsed();

        if !status.is_success() {
            warn!(status = status.as_u16(), "Service returned error status");
            self.sink
                .write_diagnostic(&format!("Server response ({}): {}", status, text));

            return Ok(ChatOutcome::HttpFailure {
                status: status.as_u16(),
                message: describe_http_failure(status.as_u16(), &text),
            });
        }

        self.sink.write_diagnostic(&format!("Raw response: {}", text));

        let api_response: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse service response: {}", e);
            BackendError::InvalidResponse {
                message: format!("JSON parse error: {}", e),
                raw_response: Some(text.chars().take(500).collect()),
            }
        })?;

        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            choices = api_response.choices.len(),
            "Chat completion received"
        );

        if let Some(usage) = &api_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Token usage"
            );
        }

        Ok(ChatOutcome::from_response(api_response))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn model_info(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

impl fmt::Debug for OpenAICompatibleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAICompatibleClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
