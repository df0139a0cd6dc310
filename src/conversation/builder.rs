use std::sync::Arc;
use tracing::{debug, warn};

use super::history::History;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::llm::Turn;

/// Persona sent as the leading system turn
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Assembles the ordered turns for one request
pub struct ConversationBuilder {
    system_prompt: Option<String>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ConversationBuilder {
    /// Builder that leads every conversation with `system_prompt`.
    /// `None` omits the system turn for model variants that reject one.
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            system_prompt,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// System turn (if any), then decoded history, then the new user turn.
    ///
    /// A history that fails to decode is reported and dropped; the exchange
    /// continues without it.
    pub fn build(&self, new_user_text: &str, history: &str) -> Vec<Turn> {
        let prior = match History::decode(history) {
            Ok(history) => history.turns(),
            Err(e) => {
                warn!(error = %e, "Ignoring undecodable history");
                self.sink
                    .write_diagnostic(&format!("History ignored: {}", e));
                Vec::new()
            }
        };

        let mut turns = Vec::with_capacity(prior.len() + 2);
        if let Some(prompt) = &self.system_prompt {
            turns.push(Turn::system(prompt.as_str()));
        }
        turns.extend(prior);
        turns.push(Turn::user(new_user_text));

        debug!(turns = turns.len(), "Built conversation");
        turns
    }
}

impl Default for ConversationBuilder {
    fn default() -> Self {
        Self::new(Some(DEFAULT_SYSTEM_PROMPT.to_string()))
    }
}
