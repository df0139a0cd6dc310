//! Backend error types
//!
//! Only transport-level faults and undecodable bodies are errors. HTTP status
//! failures are reported as `ChatOutcome::HttpFailure` instead.

use thiserror::Error;

/// Errors that can occur while talking to the chat endpoint
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Request timed out after the specified duration (in seconds)
    #[error("Request timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    /// 2xx body that does not decode as a chat response
    #[error("Invalid response from LLM: {message}")]
    InvalidResponse {
        message: String,
        raw_response: Option<String>,
    },

    /// HTTP client could not be built from the configuration
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic error for other cases
    #[error("Error: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let timeout = BackendError::TimeoutError { seconds: 60 };
        assert_eq!(timeout.to_string(), "Request timed out after 60 seconds");

        let invalid = BackendError::InvalidResponse {
            message: "expected value at line 1".to_string(),
            raw_response: Some("oops".to_string()),
        };
        assert_eq!(
            invalid.to_string(),
            "Invalid response from LLM: expected value at line 1"
        );
    }
}
