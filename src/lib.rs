//! flightdesk - a GLM chat client with local function calling
//!
//! Every exchange sends the conversation so far plus a catalog of two local
//! functions (a flight number lookup and a ticket price lookup) to an
//! OpenAI-compatible chat-completions endpoint. When the model asks for a
//! function, the first requested call is executed locally and its textual
//! result is appended to the reply.
//!
//! # Example Usage
//!
//! ```ignore
//! use flightdesk::{FlightdeskConfig, History};
//!
//! async fn ask() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FlightdeskConfig::default();
//!     config.validate()?;
//!     let chat = config.create_orchestrator()?;
//!
//!     let mut history = History::new();
//!     let question = "我想查询从北京到上海明天的航班";
//!     let reply = chat.chat(question, &history.encode()).await;
//!     history.push(question, reply.as_str());
//!
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`chat`]: exchange orchestration
//! - [`conversation`]: history encoding and turn assembly
//! - [`llm`]: wire types, the client trait, the HTTP adapter and a mock
//! - [`tools`]: function catalog, executor and the flight lookups
//! - [`config`]: environment-driven configuration
//! - [`cli`]: argument parsing and the interactive session

pub mod chat;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod diagnostics;
pub mod llm;
pub mod tools;
pub mod util;

pub use chat::{ChatOptions, ChatOrchestrator, ExchangeOutcome, ReplyKind, NO_RESPONSE};
pub use config::{ConfigError, FlightdeskConfig};
pub use conversation::{ConversationBuilder, History, HistoryError};
pub use diagnostics::DiagnosticSink;
pub use llm::{BackendError, LLMClient, OpenAICompatibleClient};
pub use tools::{FunctionExecutor, ToolRegistry};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
