use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::tool::{Tool, ToolError, Validator, parse_arguments};

/// Point-in-time copy of every registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub tools: Vec<Tool>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Compact, human-oriented view of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    /// Sorted parameter names
    pub parameters: Vec<String>,
    /// Sorted required parameter names
    pub required: Vec<String>,
}

/// A tool that a batch operation refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedTool {
    pub name: String,
    pub reason: String,
}

/// Per-item result of a batch registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Names registered, in input order
    pub registered: Vec<String>,
    pub rejected: Vec<RejectedTool>,
}

impl BatchOutcome {
    pub(crate) fn reject(&mut self, name: &str, error: &ToolError) {
        warn!(tool = %name, error = %error, "Skipping invalid tool definition");
        self.rejected.push(RejectedTool {
            name: name.to_string(),
            reason: error.to_string(),
        });
    }
}

/// Thread-safe catalog of tool definitions keyed by name.
///
/// Values are copied on the way in and on the way out, so nothing outside
/// the registry can reach the stored definitions.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Tool>>,
    clock: Arc<dyn Clock>,
}

impl ToolRegistry {
    /// Creates an empty registry using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty registry that timestamps snapshots with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Tool>> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Tool>> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register(&self, tool: Tool) -> Result<(), ToolError> {
        tool.validate()?;
        let name = tool.name.clone();
        let replaced = self.write().insert(name.clone(), tool).is_some();
        debug!(tool = %name, replaced, "Tool registered");
        Ok(())
    }

    /// Registers a tool unless one with the same name already exists.
    ///
    /// Returns `true` when the tool was inserted.
    pub fn register_if_absent(&self, tool: Tool) -> Result<bool, ToolError> {
        tool.validate()?;
        let mut tools = self.write();
        if tools.contains_key(&tool.name) {
            return Ok(false);
        }
        debug!(tool = %tool.name, "Tool registered");
        tools.insert(tool.name.clone(), tool);
        Ok(true)
    }

    /// Registers every valid tool; invalid ones are skipped and reported.
    pub fn register_multiple(&self, tools: Vec<Tool>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for tool in tools {
            let name = tool.name.clone();
            match self.register(tool) {
                Ok(()) => outcome.registered.push(name),
                Err(e) => outcome.reject(&name, &e),
            }
        }
        outcome
    }

    /// Gets a copy of a tool by name.
    pub fn get(&self, name: &str) -> Option<Tool> {
        self.read().get(name).cloned()
    }

    /// Returns copies of all tools, sorted by name.
    pub fn list(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.read().values().cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Returns all tool names, sorted.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Removes a tool, returning whether it was present.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        if removed {
            debug!(tool = %name, "Tool removed");
        }
        removed
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Returns the number of registered tools.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Decodes `raw` and validates it against the named tool's schema.
    ///
    /// Blank `raw` is treated as `{}`, as in call handling.
    pub fn validate_args(&self, name: &str, raw: &str) -> Result<(), ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let args = parse_arguments(raw)?;
        Validator::new(tool.parameters.as_ref()).validate(&args)?;
        Ok(())
    }

    /// Serializes every tool as a JSON array, sorted by name.
    pub fn to_json(&self) -> Result<String, ToolError> {
        Ok(serde_json::to_string(&self.list())?)
    }

    /// Registers the tools in a JSON array.
    ///
    /// A payload that is not a tool array fails as a whole; individual
    /// invalid tools are skipped as in [`register_multiple`](Self::register_multiple).
    pub fn from_json(&self, data: &[u8]) -> Result<BatchOutcome, ToolError> {
        let tools: Vec<Tool> = serde_json::from_slice(data)?;
        Ok(self.register_multiple(tools))
    }

    /// Captures the current contents.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let tools = self.list();
        RegistrySnapshot {
            count: tools.len(),
            tools,
            timestamp: self.clock.now(),
        }
    }

    /// Replaces the contents with those of `snapshot`.
    ///
    /// Existing tools are dropped first. Invalid entries in the snapshot are
    /// skipped and reported.
    pub fn restore(&self, snapshot: &RegistrySnapshot) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut tools = self.write();
        tools.clear();
        for tool in &snapshot.tools {
            match tool.validate() {
                Ok(()) => {
                    tools.insert(tool.name.clone(), tool.clone());
                    outcome.registered.push(tool.name.clone());
                }
                Err(e) => outcome.reject(&tool.name, &e),
            }
        }
        debug!(count = tools.len(), taken_at = %snapshot.timestamp, "Registry restored");
        outcome
    }

    /// Summarizes a single tool.
    pub fn get_summary(&self, name: &str) -> Option<ToolSummary> {
        self.read().get(name).map(summarize)
    }

    /// Summarizes every tool, sorted by name.
    pub fn list_summaries(&self) -> Vec<ToolSummary> {
        let mut summaries: Vec<ToolSummary> = self.read().values().map(summarize).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}

fn summarize(tool: &Tool) -> ToolSummary {
    let (parameters, mut required) = match &tool.parameters {
        Some(schema) => (
            schema.properties.keys().cloned().collect(),
            schema.required.clone(),
        ),
        None => (Vec::new(), Vec::new()),
    };
    required.sort();

    ToolSummary {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters,
        required,
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools_count", &self.count())
            .finish()
    }
}
