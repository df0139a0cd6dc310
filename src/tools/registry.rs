//! Tool registry
//!
//! Fixed catalog of the functions advertised to the model. The set is decided
//! at construction; there is no API to add or remove tools afterwards.

use std::sync::Arc;

use super::dates::Clock;
use super::implementations::{FlightNumberTool, TicketPriceTool};
use super::trait_def::Tool;
use crate::llm::ToolDescriptor;

/// Registry of all available tools
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the flight-number and ticket-price tools
    pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
        Self::from_tools(vec![
            Arc::new(FlightNumberTool::new(Arc::clone(&clock))),
            Arc::new(TicketPriceTool::new(clock)),
        ])
    }

    /// Registry advertising nothing; the exchange degenerates to plain chat
    pub fn empty() -> Self {
        Self::from_tools(Vec::new())
    }

    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Descriptors in registration order, as sent to the model
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Get all registered tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
