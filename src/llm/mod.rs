//! LLM client abstraction layer
//!
//! The [`LLMClient`] trait is the seam between the orchestrator and the
//! network: the HTTP adapter and the scripted mock implement it
//! interchangeably.

mod client;
mod error;
mod mock;
pub mod openai_compatible;
mod types;

pub use client::LLMClient;
pub use error::BackendError;
pub use mock::{MockLLMClient, MockResponse};
pub use openai_compatible::{describe_http_failure, OpenAICompatibleClient};
pub use types::{
    ChatOutcome, ChatRequest, ChatResponse, Choice, ErrorBody, ErrorCode, ErrorEnvelope,
    FunctionCall, MessageRole, ParameterSpec, ResponseMessage, ToolCall, ToolDescriptor, Turn,
    Usage, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};
