use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use super::HandlerError;

/// Settings for processing tool calls and submitting their results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Base URL of the agent server
    pub server_url: String,
    /// Path appended to `server_url` for result submission
    pub endpoint: String,
    /// Extra headers sent with every submission
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
    /// When false, `tool_args` overrides the arguments of every call
    pub interactive: bool,
    /// JSON object merged over parsed call arguments in non-interactive mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<String>,
    pub retry_attempts: u32,
    /// Pause between submission attempts
    #[serde(with = "humantime_duration")]
    pub retry_delay: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            endpoint: String::new(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(30),
            interactive: true,
            tool_args: None,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl HandlerConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HandlerError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            HandlerError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_slice(&data).map_err(|e| {
            HandlerError::InvalidConfig(format!("cannot parse {}: {e}", path.display()))
        })
    }

    /// Sets the server URL.
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Sets the submission endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Adds a custom header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Sets the override arguments used in non-interactive mode.
    pub fn with_tool_args(mut self, tool_args: impl Into<String>) -> Self {
        self.tool_args = Some(tool_args.into());
        self
    }

    pub fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// The URL results are posted to.
    pub fn endpoint_url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let endpoint = self.endpoint.trim_start_matches('/');
        if endpoint.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{endpoint}")
        }
    }

    /// Parsed `tool_args`, if any are set.
    pub fn override_args(&self) -> Result<Option<Map<String, Value>>, HandlerError> {
        self.tool_args
            .as_deref()
            .map(|raw| {
                serde_json::from_str::<Map<String, Value>>(raw).map_err(|e| {
                    HandlerError::InvalidConfig(format!("tool_args must be a JSON object: {e}"))
                })
            })
            .transpose()
    }

    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), HandlerError> {
        if self.server_url.trim().is_empty() {
            return Err(HandlerError::InvalidConfig("server_url cannot be empty".into()));
        }
        if self.retry_attempts == 0 {
            return Err(HandlerError::InvalidConfig(
                "retry_attempts must be at least 1".into(),
            ));
        }
        self.override_args()?;
        Ok(())
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
