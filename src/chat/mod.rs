//! Exchange orchestration: conversation, request, function dispatch, reply.

pub mod orchestrator;

pub use orchestrator::{
    ChatOptions, ChatOrchestrator, ExchangeOutcome, ExchangeState, ReplyKind, DEFAULT_MODEL,
    NO_RESPONSE, TOOL_RESULT_DELIMITER,
};
