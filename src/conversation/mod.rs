//! Conversation assembly
//!
//! Turns the caller's history blob plus the new input into the ordered list of
//! role-tagged turns sent to the model.

pub mod builder;
pub mod history;

pub use builder::{ConversationBuilder, DEFAULT_SYSTEM_PROMPT};
pub use history::{Exchange, History, HistoryError};
