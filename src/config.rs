//! Configuration management for flightdesk
//!
//! Settings are loaded from environment variables with sensible defaults; the
//! CLI overrides individual fields afterwards.
//!
//! # Environment Variables
//!
//! - `FLIGHTDESK_API_KEY`: Authorization header value, e.g. `Bearer <key>` - **required**
//! - `FLIGHTDESK_BASE_URL`: API base URL - default: "https://open.bigmodel.cn/api/paas/v4/"
//! - `FLIGHTDESK_MODEL`: Model identifier - default: "glm-4"
//! - `FLIGHTDESK_TEMPERATURE`: Sampling temperature - default: "0.9"
//! - `FLIGHTDESK_TOP_P`: Nucleus sampling - default: "0.7"
//! - `FLIGHTDESK_REQUEST_TIMEOUT`: Timeout in seconds - default: "60"
//! - `FLIGHTDESK_SYSTEM_PROMPT`: System persona; set it empty to omit the system turn
//! - `FLIGHTDESK_TOOLS_ENABLED`: Advertise the flight tools (true|false) - default: "true"
//! - `FLIGHTDESK_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use flightdesk::FlightdeskConfig;
//! use std::env;
//!
//! env::set_var("FLIGHTDESK_API_KEY", "Bearer your-key");
//!
//! let config = FlightdeskConfig::default();
//! config.validate().expect("Invalid configuration");
//! let chat = config.create_orchestrator().expect("client setup");
//! ```

use crate::chat::{ChatOptions, ChatOrchestrator, DEFAULT_MODEL};
use crate::conversation::{ConversationBuilder, DEFAULT_SYSTEM_PROMPT};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::llm::{
    BackendError, OpenAICompatibleClient, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};
use crate::tools::{FunctionExecutor, SystemClock, ToolRegistry};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4/";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TOOLS_ENABLED: bool = true;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No credential configured
    #[error("API key not specified. Set FLIGHTDESK_API_KEY (e.g. \"Bearer <key>\") or pass --api-key")]
    MissingApiKey,

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Backend initialization failed
    #[error("Backend initialization failed: {0}")]
    BackendInitError(#[from] BackendError),
}

/// Main configuration structure for flightdesk
#[derive(Clone)]
pub struct FlightdeskConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Authorization header value
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling parameter
    pub top_p: f32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Leading system turn; `None` omits it
    pub system_prompt: Option<String>,

    /// Advertise the flight tools to the model
    pub tools_enabled: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Default for FlightdeskConfig {
    /// Loads from `FLIGHTDESK_*` environment variables, falling back to defaults
    fn default() -> Self {
        let base_url =
            env::var("FLIGHTDESK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let api_key = env::var("FLIGHTDESK_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let model = env::var("FLIGHTDESK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = env_parse("FLIGHTDESK_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE);
        let top_p = env_parse("FLIGHTDESK_TOP_P").unwrap_or(DEFAULT_TOP_P);

        let request_timeout_secs =
            env_parse("FLIGHTDESK_REQUEST_TIMEOUT").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let system_prompt = match env::var("FLIGHTDESK_SYSTEM_PROMPT") {
            Ok(prompt) if prompt.trim().is_empty() => None,
            Ok(prompt) => Some(prompt),
            Err(_) => Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        };

        let tools_enabled = env_parse("FLIGHTDESK_TOOLS_ENABLED").unwrap_or(DEFAULT_TOOLS_ENABLED);

        let log_level = env::var("FLIGHTDESK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            base_url,
            api_key,
            model,
            temperature,
            top_p,
            request_timeout_secs,
            system_prompt,
            tools_enabled,
            log_level,
        }
    }
}

impl FlightdeskConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the credential is missing or any value is out
    /// of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "Base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0 and 1, got {}",
                self.temperature
            )));
        }

        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Model and sampling parameters for the orchestrator
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// Creates the HTTP client
    pub fn create_client(
        &self,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<OpenAICompatibleClient, ConfigError> {
        let api_key = self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        let client = OpenAICompatibleClient::with_timeout(
            self.base_url.as_str(),
            api_key,
            Duration::from_secs(self.request_timeout_secs),
        )?;
        Ok(client.with_sink(sink))
    }

    /// Wires client, conversation builder and tool registry together,
    /// tracing diagnostics at debug level
    pub fn create_orchestrator(&self) -> Result<ChatOrchestrator, ConfigError> {
        self.create_orchestrator_with_sink(Arc::new(TracingSink))
    }

    pub fn create_orchestrator_with_sink(
        &self,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<ChatOrchestrator, ConfigError> {
        let client = Arc::new(self.create_client(Arc::clone(&sink))?);

        let registry = if self.tools_enabled {
            ToolRegistry::with_defaults(Arc::new(SystemClock))
        } else {
            ToolRegistry::empty()
        };

        let builder = ConversationBuilder::new(self.system_prompt.clone()).with_sink(sink);

        Ok(
            ChatOrchestrator::new(client, FunctionExecutor::new(Arc::new(registry)))
                .with_conversation_builder(builder)
                .with_options(self.chat_options()),
        )
    }
}

impl fmt::Debug for FlightdeskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightdeskConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("system_prompt", &self.system_prompt)
            .field("tools_enabled", &self.tools_enabled)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl fmt::Display for FlightdeskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Flightdesk Configuration:")?;
        writeln!(f, "  Base URL: {}", self.base_url)?;
        writeln!(
            f,
            "  API Key: {}",
            if self.api_key.is_some() { "set" } else { "missing" }
        )?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(f, "  Top P: {}", self.top_p)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Tools Enabled: {}", self.tools_enabled)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
