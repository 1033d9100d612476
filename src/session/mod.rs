pub mod message;
pub mod session;

pub use message::{FunctionCall, Message, MessageRole, ToolCall, ToolResult};
pub use session::Session;
