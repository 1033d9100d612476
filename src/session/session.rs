use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Message;

/// A conversation run: the thread and run it belongs to and the running
/// message list that is sent back with every tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub thread_id: String,
    pub run_id: String,
    /// The messages in the conversation
    pub messages: Vec<Message>,
}

impl Session {
    /// Creates an empty session for the given thread and run.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self::from_snapshot(thread_id, run_id, Vec::new())
    }

    /// Creates a session seeded with a message snapshot.
    pub fn from_snapshot(
        thread_id: impl Into<String>,
        run_id: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            messages,
        }
    }

    /// Adds a message to the session.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns the number of messages in the session.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The first assistant message that requests tool calls.
    pub fn first_tool_call_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.has_tool_calls())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(
            format!("thread-{}", Uuid::new_v4()),
            format!("run-{}", Uuid::new_v4()),
        )
    }
}
