use super::error::BackendError;
use super::types::{ChatOutcome, ChatRequest};
use async_trait::async_trait;

/// Sends one chat-completion request and classifies the result.
///
/// Implementations return `Ok` for every completed HTTP exchange (including
/// non-2xx statuses) and `Err` only for transport faults or bodies that fail
/// to decode.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatOutcome, BackendError>;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ChatResponse, ResponseMessage};

    struct TestClient;

    #[async_trait]
    impl LLMClient for TestClient {
        async fn send(&self, _request: &ChatRequest) -> Result<ChatOutcome, BackendError> {
            Ok(ChatOutcome::Completion(ChatResponse::from_message(
                ResponseMessage {
                    content: Some("Test response".to_string()),
                    ..Default::default()
                },
            )))
        }

        fn name(&self) -> &str {
            "TestClient"
        }
    }

    #[tokio::test]
    async fn test_client_trait() {
        let client = TestClient;
        assert_eq!(client.name(), "TestClient");
        assert!(client.model_info().is_none());

        let outcome = client
            .send(&ChatRequest::new("glm-4", Vec::new()))
            .await
            .unwrap();
        assert!(matches!(outcome, ChatOutcome::Completion(_)));
    }
}
