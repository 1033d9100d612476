//! Running tool calls end to end: look up, validate, execute and submit the
//! result back to the agent server.

pub mod config;
pub mod handler;
pub mod submit;

pub use config::HandlerConfig;
pub use handler::ToolCallHandler;
pub use submit::{ResultSubmitter, SubmissionEnvelope};

use crate::tool::ToolError;

/// Errors that can occur while handling a tool call.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Lookup, argument or execution failure for the call
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("Unsupported tool call type: {0}")]
    UnsupportedCallType(String),
    #[error("Invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Every submission attempt failed
    #[error("failed to submit tool result after {attempts} attempts: {last}")]
    SubmissionFailed {
        attempts: u32,
        #[source]
        last: TransportError,
    },
    #[error("Submission cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

/// A failed submission attempt. Always retryable.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code {0}")]
    Status(u16),
}
