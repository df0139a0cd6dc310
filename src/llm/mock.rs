use super::client::LLMClient;
use super::error::BackendError;
use super::types::{
    ChatOutcome, ChatRequest, ChatResponse, MessageRole, ResponseMessage, ToolCall,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted client that replays queued outcomes and records every request
pub struct MockLLMClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
    name: String,
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Outcome(ChatOutcome),
    Error(BackendError),
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Outcome(ChatOutcome::Completion(ChatResponse::from_message(
            ResponseMessage {
                role: Some(MessageRole::Assistant),
                content: Some(content.into()),
                tool_calls: None,
            },
        )))
    }

    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Outcome(ChatOutcome::Completion(ChatResponse::from_message(
            ResponseMessage {
                role: Some(MessageRole::Assistant),
                content: Some(content.into()),
                tool_calls: Some(tool_calls),
            },
        )))
    }

    pub fn http_failure(status: u16, message: impl Into<String>) -> Self {
        Self::Outcome(ChatOutcome::HttpFailure {
            status,
            message: message.into(),
        })
    }

    pub fn empty() -> Self {
        Self::Outcome(ChatOutcome::Empty)
    }

    pub fn error(error: BackendError) -> Self {
        Self::Error(error)
    }
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self::with_name("MockLLM")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn flight_number_call(
        call_id: impl Into<String>,
        departure: &str,
        destination: &str,
        date: &str,
    ) -> ToolCall {
        ToolCall::function(
            call_id,
            "get_flight_number",
            serde_json::json!({
                "departure": departure,
                "destination": destination,
                "date": date
            })
            .to_string(),
        )
    }

    pub fn ticket_price_call(call_id: impl Into<String>, flight_number: &str, date: &str) -> ToolCall {
        ToolCall::function(
            call_id,
            "get_ticket_price",
            serde_json::json!({ "flight_number": flight_number, "date": date }).to_string(),
        )
    }
}

impl Default for MockLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatOutcome, BackendError> {
        self.requests.lock().unwrap().push(request.clone());

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BackendError::Other {
                message: "MockLLMClient: No more responses in queue".to_string(),
            })?;

        match response {
            MockResponse::Outcome(outcome) => Ok(outcome),
            MockResponse::Error(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockLLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLMClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest::new("glm-4", Vec::new())
    }

    #[tokio::test]
    async fn test_mock_client_basic() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::text("Hello!"));

        let outcome = client.send(&request()).await.unwrap();

        match outcome {
            ChatOutcome::Completion(response) => {
                let message = &response.first_choice().unwrap().message;
                assert_eq!(message.text(), "Hello!");
                assert!(message.tool_calls().is_empty());
            }
            other => panic!("Expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_client_with_tool_calls() {
        let client = MockLLMClient::new();
        let call = MockLLMClient::ticket_price_call("call_1", "CA1501", "2024-06-02");
        client.add_response(MockResponse::with_tool_calls("", vec![call]));

        let outcome = client.send(&request()).await.unwrap();
        let ChatOutcome::Completion(response) = outcome else {
            panic!("Expected completion");
        };
        let calls = response.first_choice().unwrap().message.tool_calls();
        assert_eq!(calls[0].function.name, "get_ticket_price");
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let client = MockLLMClient::new();
        client.add_response(MockResponse::error(BackendError::TimeoutError { seconds: 30 }));

        assert!(client.send(&request()).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_client_no_responses() {
        let client = MockLLMClient::new();
        assert!(client.send(&request()).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_client_records_requests() {
        let client = MockLLMClient::new();
        client.add_responses(vec![MockResponse::empty(), MockResponse::empty()]);

        client.send(&request()).await.unwrap();
        client
            .send(&ChatRequest::new("glm-4-flash", Vec::new()))
            .await
            .unwrap();

        assert_eq!(client.remaining_responses(), 0);
        assert_eq!(client.requests().len(), 2);
        assert_eq!(client.last_request().unwrap().model, "glm-4-flash");
    }

    #[test]
    fn test_helper_methods() {
        let call = MockLLMClient::flight_number_call("id1", "北京", "上海", "明天");
        assert_eq!(call.function.name, "get_flight_number");
        assert!(call.function.arguments.contains("北京"));
    }

    #[test]
    fn test_custom_name() {
        let client = MockLLMClient::with_name("TestClient");
        assert_eq!(client.name(), "TestClient");
    }
}
