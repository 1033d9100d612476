pub mod executor;
pub mod registry;
pub mod schema;
pub mod validator;

pub use executor::{PlaceholderExecutor, ToolExecutor};
pub use registry::{BatchOutcome, RegistrySnapshot, RejectedTool, ToolRegistry, ToolSummary};
pub use schema::{Property, PropertyType, Tool, ToolSchema, tool_definition_schema};
pub use tool_types::ToolError;
pub use validator::{ValidationError, Validator, parse_arguments};

mod tool_types {
    use super::validator::ValidationError;

    /// Errors that can occur when defining, looking up or running a tool.
    #[derive(Debug, thiserror::Error)]
    pub enum ToolError {
        /// The tool definition is structurally invalid
        #[error("Invalid tool definition '{tool}': {reason}")]
        InvalidDefinition { tool: String, reason: String },
        /// No tool is registered under the name
        #[error("Tool not found: {0}")]
        NotFound(String),
        /// The arguments could not be decoded into a JSON object
        #[error("Invalid arguments: {0}")]
        InvalidArguments(String),
        /// The arguments do not satisfy the tool's schema
        #[error(transparent)]
        Validation(#[from] ValidationError),
        #[error("Execution failed: {0}")]
        ExecutionFailed(String),
        #[error("Serialization error: {0}")]
        Serialization(#[from] serde_json::Error),
    }
}
