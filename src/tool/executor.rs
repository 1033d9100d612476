use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::tool::{Tool, ToolError};

/// Backend that actually runs a tool once its arguments are validated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Runs `tool` with `args` and returns the text sent back to the
    /// conversation.
    async fn execute(&self, tool: &Tool, args: &Map<String, Value>) -> Result<String, ToolError>;
}

/// Executor that performs no work and reports success, echoing the tool
/// name and arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderExecutor;

#[async_trait]
impl ToolExecutor for PlaceholderExecutor {
    async fn execute(&self, tool: &Tool, args: &Map<String, Value>) -> Result<String, ToolError> {
        let output = json!({
            "status": "success",
            "tool": tool.name,
            "arguments": args,
        });
        Ok(serde_json::to_string(&output)?)
    }
}
