use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::registry::ToolRegistry;
use crate::llm::ToolDescriptor;

/// Dispatches a model-requested function call to the registered tool.
///
/// Every outcome is text: unknown names, undecodable arguments and tool
/// failures are rendered into the result instead of being returned as errors.
pub struct FunctionExecutor {
    registry: Arc<ToolRegistry>,
}

impl FunctionExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, name: &str, arguments: &str) -> String {
        info!(tool = name, args = arguments, "Executing function");

        let Some(tool) = self.registry.get_tool(name) else {
            warn!(tool = name, "Unknown function requested");
            return format!("Unknown function: {}", name);
        };

        let start = Instant::now();
        match tool.execute(arguments).await {
            Ok(output) => {
                info!(
                    tool = name,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Function execution completed"
                );
                debug!(tool = name, output = %output, "Function output");
                output
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Function execution failed");
                format!("Function {} failed: {:#}", name, e)
            }
        }
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.list()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::dates::FixedClock;
    use chrono::NaiveDate;

    fn executor() -> FunctionExecutor {
        let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        FunctionExecutor::new(Arc::new(ToolRegistry::with_defaults(clock)))
    }

    #[tokio::test]
    async fn test_execute_flight_lookup() {
        let result = executor()
            .execute(
                "get_flight_number",
                r#"{"departure":"北京","destination":"上海","date":"后天"}"#,
            )
            .await;
        assert!(result.contains("date=2024-06-03"));
        assert!(result.contains("CA1501"));
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let result = executor().execute("book_hotel", "{}").await;
        assert_eq!(result, "Unknown function: book_hotel");
    }

    #[tokio::test]
    async fn test_decode_failure_becomes_text() {
        let result = executor().execute("get_ticket_price", "[1, 2]").await;
        assert!(result.starts_with("Function get_ticket_price failed: Invalid arguments"));
    }

    #[tokio::test]
    async fn test_bad_date_becomes_text() {
        let result = executor()
            .execute(
                "get_flight_number",
                r#"{"departure":"北京","destination":"上海","date":"下周三"}"#,
            )
            .await;
        assert!(result.contains("Invalid date '下周三'"));
        assert!(result.contains("yyyy-MM-dd"));
    }

    #[tokio::test]
    async fn test_empty_registry_rejects_everything() {
        let executor = FunctionExecutor::new(Arc::new(ToolRegistry::empty()));
        assert!(executor.descriptors().is_empty());
        assert_eq!(
            executor.execute("get_flight_number", "{}").await,
            "Unknown function: get_flight_number"
        );
    }
}
