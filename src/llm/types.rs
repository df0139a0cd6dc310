//! Chat-completion wire types
//!
//! This module defines the request and response records exchanged with an
//! OpenAI-compatible `/chat/completions` endpoint, plus the typed error
//! envelope returned on non-2xx responses.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.9;

/// Default nucleus sampling parameter
pub const DEFAULT_TOP_P: f32 = 0.7;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions
    System,
    /// User message
    User,
    /// Assistant (LLM) response
    Assistant,
}

/// One role-tagged message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the message sender
    pub role: MessageRole,
    /// Text content of the message
    pub content: String,
}

impl Turn {
    /// Creates a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Creates a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Schema entry for a single function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// JSON type of the parameter ("string", "integer", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// What the parameter means, shown to the model
    pub description: String,
}

impl ParameterSpec {
    pub fn string(description: impl Into<String>) -> Self {
        Self {
            kind: "string".to_string(),
            description: description.into(),
        }
    }
}

/// Declared schema advertising a callable function to the model
///
/// Serializes to the `{"type": "function", "function": {...}}` shape the
/// chat-completions API expects in its `tools` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Function name the model uses to request a call
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// Parameter name to schema entry
    pub parameters: BTreeMap<String, ParameterSpec>,
    /// Parameters that must be present in every call
    pub required: Vec<String>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Adds a required string parameter
    pub fn required_param(mut self, name: &str, description: impl Into<String>) -> Self {
        self.parameters
            .insert(name.to_string(), ParameterSpec::string(description));
        self.required.push(name.to_string());
        self
    }

}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: WireParameters<'a>,
}

#[derive(Serialize)]
struct WireParameters<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: &'a BTreeMap<String, ParameterSpec>,
    required: &'a [String],
}

impl Serialize for ToolDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireTool {
            kind: "function",
            function: WireFunction {
                name: &self.name,
                description: &self.description,
                parameters: WireParameters {
                    kind: "object",
                    properties: &self.parameters,
                    required: &self.required,
                },
            },
        }
        .serialize(serializer)
    }
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Conversation turns, oldest first
    pub messages: Vec<Turn>,
    /// Function catalog; always sent, even when empty
    pub tools: Vec<ToolDescriptor>,
    /// Always "auto": the model decides whether to call a function
    pub tool_choice: &'static str,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling parameter
    pub top_p: f32,
}

impl ChatRequest {
    /// Creates a request with default sampling parameters and no tools
    pub fn new(model: impl Into<String>, messages: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: "auto",
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }

    /// Adds the function catalog
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    /// Sets the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets top_p
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Name and JSON-encoded arguments of a requested function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments as JSON text. Some providers inline an object instead of a
    /// string; that object is re-encoded to text.
    #[serde(default, deserialize_with = "deserialize_arguments")]
    pub arguments: String,
}

fn deserialize_arguments<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Message carried by a response choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<MessageRole>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ResponseMessage {
    /// Text content, empty when the provider sent `null`
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Requested function calls, empty when absent
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

/// Completion choice from the response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: u32,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Response body from the chat-completions endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ChatResponse {
    /// Builds a single-choice response, mainly for tests and mocks
    pub fn from_message(message: ResponseMessage) -> Self {
        Self {
            choices: vec![Choice {
                message,
                finish_reason: Some("stop".to_string()),
                index: 0,
            }],
            ..Default::default()
        }
    }

    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }
}

/// Error code inside an error envelope; providers send either form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Text(code) => write!(f, "{}", code),
            ErrorCode::Number(code) => write!(f, "{}", code),
        }
    }
}

/// Inner `error` object of a failed response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<ErrorCode>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{"error": {"code": ..., "message": ...}}` returned with non-2xx statuses
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

impl ErrorEnvelope {
    /// Decodes the envelope from a response body. Returns `None` when the body
    /// is not JSON or carries no `error` object.
    pub fn parse(body: &str) -> Option<ErrorBody> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error)
    }
}

/// Result of a completed HTTP exchange with the endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// 2xx response with at least one choice
    Completion(ChatResponse),
    /// Non-2xx response, already rendered as user-facing text
    HttpFailure { status: u16, message: String },
    /// 2xx response whose `choices` was empty or absent
    Empty,
}

impl ChatOutcome {
    /// Classifies a decoded 2xx response
    pub fn from_response(response: ChatResponse) -> Self {
        if response.choices.is_empty() {
            ChatOutcome::Empty
        } else {
            ChatOutcome::Completion(response)
        }
    }
}
