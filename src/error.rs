//! Error types for the tool-runtime library.

use thiserror::Error;

/// Unified error type for the tool runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Tool-related error
    #[error("Tool error: {0}")]
    Tool(#[from] crate::tool::ToolError),

    /// Arguments failed schema validation
    #[error(transparent)]
    Validation(#[from] crate::tool::ValidationError),

    /// Discovery-related error
    #[error("Discovery error: {0}")]
    Discovery(#[from] crate::discovery::DiscoveryError),

    /// Tool call handling error
    #[error("Handler error: {0}")]
    Handler(#[from] crate::handler::HandlerError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
