use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ConfigSource, DiscoveryError, DiscoverySource, DiscoveryStats, infer_schema_from_arguments};
use crate::session::{Message, MessageRole, ToolCall};
use crate::tool::{BatchOutcome, Tool, ToolRegistry};

/// Fills a [`ToolRegistry`] and records the source of every tool it adds.
pub struct ToolDiscovery {
    registry: Arc<ToolRegistry>,
    sources: RwLock<HashMap<String, DiscoverySource>>,
}

impl ToolDiscovery {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            sources: RwLock::new(HashMap::new()),
        }
    }

    /// The registry being populated.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Registers a JSON array of full tool definitions.
    ///
    /// Invalid definitions are skipped; an unparseable payload is an error.
    pub fn discover_from_tool_definitions(&self, data: &[u8]) -> Result<BatchOutcome, DiscoveryError> {
        let tools: Vec<Tool> = serde_json::from_slice(data)?;
        Ok(self.register_all(tools, DiscoverySource::ToolDefinition))
    }

    /// Parses a JSON array of messages and discovers tools from their calls.
    ///
    /// Only a payload that is not an array is an error. Messages that cannot
    /// be decoded are skipped.
    pub fn discover_from_messages_snapshot(&self, data: &[u8]) -> Result<BatchOutcome, DiscoveryError> {
        let entries: Vec<Value> = serde_json::from_slice(data)?;
        let messages: Vec<Message> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed message");
                    None
                }
            })
            .collect();
        Ok(self.discover_from_messages(&messages))
    }

    /// Registers a minimal tool for every function call whose name is not
    /// yet known, inferring its schema from the call's arguments.
    pub fn discover_from_messages(&self, messages: &[Message]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        let calls = messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .flat_map(|m| m.tool_calls.iter());

        for call in calls {
            if !call.is_function() {
                debug!(call_id = %call.id, call_type = %call.call_type, "Ignoring non-function tool call");
                continue;
            }
            let name = &call.function.name;
            if name.is_empty() || self.registry.has(name) {
                continue;
            }

            match self.registry.register_if_absent(tool_from_call(call)) {
                Ok(true) => {
                    self.record(name, DiscoverySource::MessagesSnapshot);
                    outcome.registered.push(name.clone());
                }
                Ok(false) => {}
                Err(e) => outcome.reject(name, &e),
            }
        }

        info!(discovered = outcome.registered.len(), "Discovered tools from messages");
        outcome
    }

    /// Registers tools carried by configuration.
    pub fn discover_from_config(&self, source: ConfigSource) -> Result<BatchOutcome, DiscoveryError> {
        let tools = match source {
            ConfigSource::FilePath(path) => {
                return Err(DiscoveryError::FileSourceUnsupported(path));
            }
            ConfigSource::RawJson(data) => serde_json::from_slice(&data)?,
            ConfigSource::ToolList(tools) => tools,
            ConfigSource::ConfigMap(mut config) => {
                let tools = config.remove("tools").ok_or(DiscoveryError::MissingToolsKey)?;
                serde_json::from_value(tools)?
            }
        };
        Ok(self.register_all(tools, DiscoverySource::Config))
    }

    /// Registers a JSON array of tool definitions given on the command line.
    pub fn discover_from_cli(&self, raw: &str) -> Result<BatchOutcome, DiscoveryError> {
        let tools: Vec<Tool> = serde_json::from_str(raw)?;
        Ok(self.register_all(tools, DiscoverySource::Cli))
    }

    fn register_all(&self, tools: Vec<Tool>, source: DiscoverySource) -> BatchOutcome {
        let outcome = self.registry.register_multiple(tools);
        for name in &outcome.registered {
            self.record(name, source);
        }
        info!(
            source = %source,
            registered = outcome.registered.len(),
            rejected = outcome.rejected.len(),
            "Discovered tools"
        );
        outcome
    }

    fn record(&self, name: &str, source: DiscoverySource) {
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), source);
    }

    /// Where a tool was discovered, if it was.
    pub fn tool_source(&self, name: &str) -> Option<DiscoverySource> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Sorted names of the tools discovered through `source`.
    pub fn tools_by_source(&self, source: DiscoverySource) -> Vec<String> {
        let mut names: Vec<String> = self
            .sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, s)| **s == source)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> DiscoveryStats {
        let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);

        let mut stats = DiscoveryStats {
            total: sources.len(),
            ..DiscoveryStats::default()
        };
        for (name, source) in sources.iter() {
            *stats.by_source.entry(*source).or_insert(0) += 1;
            stats.tools.push(name.clone());
        }
        stats.tools.sort();
        stats
    }

    /// Empties both the registry and the source records.
    pub fn clear(&self) {
        self.registry.clear();
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn tool_from_call(call: &ToolCall) -> Tool {
    let mut tool = Tool::new(
        call.function.name.clone(),
        format!("Tool discovered from tool call {}", call.id),
    );
    if !call.function.arguments.trim().is_empty() {
        tool.parameters = infer_schema_from_arguments(&call.function.arguments);
    }
    tool
}

impl fmt::Debug for ToolDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDiscovery")
            .field("registry", &self.registry)
            .field("discovered", &self.stats().total)
            .finish()
    }
}
