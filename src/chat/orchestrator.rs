use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::conversation::ConversationBuilder;
use crate::llm::{
    ChatOutcome, ChatRequest, ChatResponse, LLMClient, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};
use crate::tools::FunctionExecutor;

/// Reply returned when the model produced no choices
pub const NO_RESPONSE: &str = "No response";

/// Separates the model's text from an appended function result
pub const TOOL_RESULT_DELIMITER: &str = "\n\n";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "glm-4";

/// Model and sampling parameters applied to every request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

/// Stages of a single exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Building,
    Sent,
    PlainReply,
    ToolRequested,
    Done,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExchangeState::Building => "building",
            ExchangeState::Sent => "sent",
            ExchangeState::PlainReply => "plain_reply",
            ExchangeState::ToolRequested => "tool_requested",
            ExchangeState::Done => "done",
        };
        f.write_str(name)
    }
}

/// How the final reply was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    /// Model text, verbatim
    Plain,
    /// Model text plus the result of the named function
    ToolInvoked { name: String },
    /// The response carried no choices
    NoResponse,
    /// Non-2xx HTTP status, rendered as text
    HttpFailure { status: u16 },
    /// Transport fault or undecodable response
    Failed,
}

/// Final text of an exchange and how it came about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub reply: String,
    pub kind: ReplyKind,
}

impl ExchangeOutcome {
    fn new(reply: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            reply: reply.into(),
            kind,
        }
    }
}

/// Runs one exchange: build the request, send it, dispatch at most one
/// function call, and compose the reply.
///
/// Only the first tool call of a response is executed; any further calls in
/// the same response are logged and dropped. The function result is not sent
/// back to the model.
pub struct ChatOrchestrator {
    client: Arc<dyn LLMClient>,
    builder: ConversationBuilder,
    executor: FunctionExecutor,
    options: ChatOptions,
}

impl ChatOrchestrator {
    pub fn new(client: Arc<dyn LLMClient>, executor: FunctionExecutor) -> Self {
        Self {
            client,
            builder: ConversationBuilder::default(),
            executor,
            options: ChatOptions::default(),
        }
    }

    pub fn with_conversation_builder(mut self, builder: ConversationBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Sends `user_text` with the prior `history` and returns the reply text.
    /// Never fails: every problem is described in the returned text.
    pub async fn chat(&self, user_text: &str, history: &str) -> String {
        self.chat_detailed(user_text, history).await.reply
    }

    pub async fn chat_detailed(&self, user_text: &str, history: &str) -> ExchangeOutcome {
        let mut state = ExchangeState::Building;

        let turns = self.builder.build(user_text, history);
        let request = ChatRequest::new(self.options.model.as_str(), turns)
            .with_tools(self.executor.descriptors())
            .with_temperature(self.options.temperature)
            .with_top_p(self.options.top_p);

        advance(&mut state, ExchangeState::Sent);
        info!(
            client = self.client.name(),
            endpoint = ?self.client.model_info(),
            model = %request.model,
            "Sending exchange"
        );

        let outcome = match self.client.send(&request).await {
            Ok(ChatOutcome::Completion(response)) => self.resolve(&mut state, response).await,
            Ok(ChatOutcome::Empty) => {
                warn!("Response contained no choices");
                ExchangeOutcome::new(NO_RESPONSE, ReplyKind::NoResponse)
            }
            Ok(ChatOutcome::HttpFailure { status, message }) => {
                warn!(status, "Exchange ended with HTTP failure");
                ExchangeOutcome::new(message, ReplyKind::HttpFailure { status })
            }
            Err(e) => {
                error!(error = %e, "Exchange failed");
                ExchangeOutcome::new(format!("Error: {}", e), ReplyKind::Failed)
            }
        };

        advance(&mut state, ExchangeState::Done);
        outcome
    }

    async fn resolve(&self, state: &mut ExchangeState, response: ChatResponse) -> ExchangeOutcome {
        let Some(choice) = response.choices.into_iter().next() else {
            return ExchangeOutcome::new(NO_RESPONSE, ReplyKind::NoResponse);
        };

        let content = choice.message.content.unwrap_or_default();
        let mut calls = choice.message.tool_calls.unwrap_or_default().into_iter();

        let Some(call) = calls.next() else {
            advance(state, ExchangeState::PlainReply);
            return ExchangeOutcome::new(content, ReplyKind::Plain);
        };

        advance(state, ExchangeState::ToolRequested);
        let ignored = calls.len();
        if ignored > 0 {
            warn!(
                executed = %call.function.name,
                ignored,
                "Response requested several function calls; only the first is executed"
            );
        }

        let result = self
            .executor
            .execute(&call.function.name, &call.function.arguments)
            .await;

        ExchangeOutcome::new(
            format!("{}{}{}", content, TOOL_RESULT_DELIMITER, result),
            ReplyKind::ToolInvoked {
                name: call.function.name,
            },
        )
    }
}

fn advance(state: &mut ExchangeState, next: ExchangeState) {
    debug!(from = %state, to = %next, "Exchange state transition");
    *state = next;
}

impl fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("client", &self.client.name())
            .field("endpoint", &self.client.model_info())
            .field("tools", &self.executor.registry().tool_names())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BackendError, MockLLMClient, MockResponse, ToolCall};
    use crate::tools::{FixedClock, ToolRegistry, TICKET_PRICE_RANGE};
    use chrono::NaiveDate;

    fn orchestrator(client: Arc<MockLLMClient>) -> ChatOrchestrator {
        let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        let registry = Arc::new(ToolRegistry::with_defaults(clock));
        ChatOrchestrator::new(client, FunctionExecutor::new(registry))
    }

    #[tokio::test]
    async fn test_plain_reply_is_content_verbatim() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("北京到上海每天都有很多航班。"));

        let outcome = orchestrator(Arc::clone(&client))
            .chat_detailed("有航班吗", "")
            .await;

        assert_eq!(outcome.reply, "北京到上海每天都有很多航班。");
        assert_eq!(outcome.kind, ReplyKind::Plain);
    }

    #[tokio::test]
    async fn test_request_carries_tools_and_sampling() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("ok"));

        orchestrator(Arc::clone(&client)).chat("hi", "").await;

        let request = client.last_request().unwrap();
        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.tool_choice, "auto");
        assert_eq!(request.tools.len(), 2);
        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(request.top_p, DEFAULT_TOP_P);
    }

    #[tokio::test]
    async fn test_tool_reply_appends_result() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::with_tool_calls(
            "正在查询票价",
            vec![MockLLMClient::ticket_price_call("call_1", "CA1501", "明天")],
        ));

        let outcome = orchestrator(Arc::clone(&client)).chat_detailed("多少钱", "").await;

        let (content, result) = outcome.reply.split_once(TOOL_RESULT_DELIMITER).unwrap();
        assert_eq!(content, "正在查询票价");
        assert!(result.contains("flight_number=CA1501"));
        assert!(result.contains("date=2024-06-02"));

        let price: u32 = result
            .trim_end_matches(" CNY")
            .rsplit(' ')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(TICKET_PRICE_RANGE.contains(&price));
        assert_eq!(
            outcome.kind,
            ReplyKind::ToolInvoked {
                name: "get_ticket_price".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_only_first_tool_call_runs() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::with_tool_calls(
            "",
            vec![
                MockLLMClient::flight_number_call("call_1", "北京", "上海", "today"),
                ToolCall::function("call_2", "book_hotel", "{}"),
            ],
        ));

        let reply = orchestrator(Arc::clone(&client)).chat("查航班", "").await;

        assert!(reply.starts_with(TOOL_RESULT_DELIMITER));
        assert!(reply.contains("date=2024-06-01"));
        assert!(!reply.contains("book_hotel"));
    }

    #[tokio::test]
    async fn test_unknown_function_folded_into_reply() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::with_tool_calls(
            "ok",
            vec![ToolCall::function("call_1", "book_hotel", "{}")],
        ));

        let reply = orchestrator(Arc::clone(&client)).chat("hotel", "").await;
        assert_eq!(reply, "ok\n\nUnknown function: book_hotel");
    }

    #[tokio::test]
    async fn test_empty_choices_yield_sentinel() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::empty());

        let outcome = orchestrator(Arc::clone(&client)).chat_detailed("hi", "").await;
        assert_eq!(outcome.reply, NO_RESPONSE);
        assert_eq!(outcome.kind, ReplyKind::NoResponse);
    }

    #[tokio::test]
    async fn test_http_failure_passed_through() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::http_failure(404, "HTTP 404: not found"));

        let outcome = orchestrator(Arc::clone(&client)).chat_detailed("hi", "").await;
        assert_eq!(outcome.reply, "HTTP 404: not found");
        assert_eq!(outcome.kind, ReplyKind::HttpFailure { status: 404 });
    }

    #[tokio::test]
    async fn test_transport_error_becomes_text() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::error(BackendError::NetworkError {
            message: "Connection failed: refused".to_string(),
        }));

        let outcome = orchestrator(Arc::clone(&client)).chat_detailed("hi", "").await;
        assert_eq!(outcome.reply, "Error: Network error: Connection failed: refused");
        assert_eq!(outcome.kind, ReplyKind::Failed);
    }

    #[test]
    fn test_debug_names_client_and_endpoint() {
        let chat = orchestrator(Arc::new(MockLLMClient::with_name("scripted")));
        let debug_str = format!("{:?}", chat);
        assert!(debug_str.contains("scripted"));
        assert!(debug_str.contains("mock-model"));
        assert!(debug_str.contains("get_flight_number"));
    }

    #[tokio::test]
    async fn test_plain_chat_variant_sends_no_tools() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("hello"));

        let chat = ChatOrchestrator::new(
            Arc::clone(&client) as Arc<dyn LLMClient>,
            FunctionExecutor::new(Arc::new(ToolRegistry::empty())),
        )
        .with_options(ChatOptions {
            model: "glm-4-flash".to_string(),
            temperature: 0.5,
            top_p: 0.9,
        });

        assert_eq!(chat.chat("hi", "").await, "hello");
        let request = client.last_request().unwrap();
        assert!(request.tools.is_empty());
        assert_eq!(request.model, "glm-4-flash");
        assert_eq!(request.temperature, 0.5);
    }
}
