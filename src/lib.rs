//! # Tool Runtime
//!
//! The tool calling layer of an agent client: a concurrent tool catalog,
//! schema validation of call arguments, tool discovery and the lifecycle that
//! executes calls and posts results back to the agent server.
//!
//! ## Features
//!
//! - **Tool Catalog**: Thread-safe registry with copy-in/copy-out semantics
//! - **Schema Validation**: A practical subset of JSON Schema with field paths in errors
//! - **Discovery**: Register tools from definitions, configuration or observed tool calls
//! - **Call Handling**: Validate, execute and submit results with retry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tool_runtime::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(ToolRegistry::new());
//!     let discovery = ToolDiscovery::new(registry.clone());
//!     discovery.discover_from_cli(r#"[{"name": "echo", "description": "Echo input"}]"#)?;
//!
//!     let config = HandlerConfig::new()
//!         .with_server_url("http://localhost:8000")
//!         .with_endpoint("agentic_chat");
//!     let handler = ToolCallHandler::new(&config, registry, Arc::new(PlaceholderExecutor))?;
//!
//!     let mut session = Session::from_snapshot(
//!         "thread-1",
//!         "run-1",
//!         vec![Message::new_assistant(
//!             None,
//!             vec![ToolCall::function("call-1", "echo", r#"{"text": "hi"}"#)],
//!         )],
//!     );
//!
//!     for result in handler.process_session(&mut session, &CancellationToken::new()).await {
//!         println!("{:?}", result);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod discovery;
pub mod error;
pub mod handler;
pub mod session;
pub mod tool;

// Re-exports for convenient usage
pub use clock::{Clock, FixedClock, SystemClock};
pub use discovery::{ConfigSource, DiscoveryError, DiscoverySource, DiscoveryStats, ToolDiscovery};
pub use error::RuntimeError;
pub use handler::{HandlerConfig, HandlerError, ResultSubmitter, ToolCallHandler, TransportError};
pub use session::{FunctionCall, Message, MessageRole, Session, ToolCall, ToolResult};
pub use tool::{
    BatchOutcome, PlaceholderExecutor, Property, PropertyType, RegistrySnapshot, Tool, ToolError,
    ToolExecutor, ToolRegistry, ToolSchema, ToolSummary, ValidationError, Validator,
};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::discovery::{ConfigSource, ToolDiscovery};
    pub use crate::handler::{HandlerConfig, ToolCallHandler};
    pub use crate::session::{Message, Session, ToolCall, ToolResult};
    pub use crate::tool::{
        PlaceholderExecutor, Property, Tool, ToolExecutor, ToolRegistry, ToolSchema,
    };
    pub use crate::RuntimeError;
    pub use std::sync::Arc;
    pub use tokio_util::sync::CancellationToken;
}
