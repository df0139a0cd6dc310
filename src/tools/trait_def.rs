use crate::llm::ToolDescriptor;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn descriptor(&self) -> ToolDescriptor;
    async fn execute(&self, arguments: &str) -> Result<String>;
}
