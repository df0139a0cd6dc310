//! Caller-owned conversation history
//!
//! The canonical encoding is a JSON array of `[user, assistant]` pairs:
//!
//! ```text
//! [["我想去上海", "好的，请问哪天出发？"], ["明天", "..."]]
//! ```
//!
//! The caller stores the encoded text between exchanges and hands it back on
//! the next turn.

use crate::llm::Turn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Malformed conversation history: {0}")]
pub struct HistoryError(#[from] serde_json::Error);

/// One completed exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange(pub String, pub String);

impl Exchange {
    pub fn user(&self) -> &str {
        &self.0
    }

    pub fn assistant(&self) -> &str {
        &self.1
    }
}

/// Ordered list of prior exchanges, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    exchanges: Vec<Exchange>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the canonical encoding. Blank text is an empty history.
    pub fn decode(encoded: &str) -> Result<Self, HistoryError> {
        if encoded.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_json::from_str(encoded)?)
    }

    /// Encodes to the canonical form
    pub fn encode(&self) -> String {
        // Serializing plain strings into JSON cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn push(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.exchanges.push(Exchange(user.into(), assistant.into()));
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Alternating user/assistant turns in original order
    pub fn turns(&self) -> Vec<Turn> {
        self.exchanges
            .iter()
            .flat_map(|exchange| {
                [
                    Turn::user(exchange.user()),
                    Turn::assistant(exchange.assistant()),
                ]
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}
