//! Populating the tool registry from definitions, configuration and
//! example tool calls, while remembering where each tool came from.

pub mod discoverer;
pub mod infer;

pub use discoverer::ToolDiscovery;
pub use infer::infer_schema_from_arguments;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::tool::{Tool, ToolError};

/// Where a registered tool was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    /// Inferred from a tool call in an assistant message
    MessagesSnapshot,
    /// An explicit tool definition payload
    ToolDefinition,
    Config,
    /// Definitions passed on the command line
    Cli,
}

impl DiscoverySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessagesSnapshot => "messages_snapshot",
            Self::ToolDefinition => "tool_definition",
            Self::Config => "config",
            Self::Cli => "cli",
        }
    }
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shapes of configuration that can carry tool definitions.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// A path on disk. Reading files is the caller's job, so this is rejected.
    FilePath(PathBuf),
    /// A JSON array of tool definitions
    RawJson(Vec<u8>),
    ToolList(Vec<Tool>),
    /// A configuration object whose `tools` entry holds the definitions
    ConfigMap(Map<String, Value>),
}

/// Counts of discovered tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryStats {
    pub total: usize,
    pub by_source: BTreeMap<DiscoverySource, usize>,
    /// Sorted names of every discovered tool
    pub tools: Vec<String>,
}

/// Errors from discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The payload is not valid JSON of the expected shape
    #[error("Invalid discovery payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("File sources must be read by the caller: {}", .0.display())]
    FileSourceUnsupported(PathBuf),
    #[error("Configuration has no 'tools' entry")]
    MissingToolsKey,
    #[error(transparent)]
    Tool(#[from] ToolError),
}
