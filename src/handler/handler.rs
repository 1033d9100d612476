use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{HandlerConfig, HandlerError, ResultSubmitter};
use crate::session::{Message, Session, ToolCall, ToolResult};
use crate::tool::{Tool, ToolError, ToolExecutor, ToolRegistry, Validator, parse_arguments};

/// Drives tool calls through lookup, validation, execution and submission.
pub struct ToolCallHandler {
    registry: Arc<ToolRegistry>,
    executor: Arc<dyn ToolExecutor>,
    submitter: ResultSubmitter,
    /// Merged over every call's arguments when not interactive
    override_args: Option<Map<String, Value>>,
}

impl ToolCallHandler {
    /// Creates a handler. The configuration is validated first.
    pub fn new(
        config: &HandlerConfig,
        registry: Arc<ToolRegistry>,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<Self, HandlerError> {
        config.validate()?;
        let override_args = if config.interactive {
            None
        } else {
            config.override_args()?
        };

        Ok(Self {
            registry,
            executor,
            submitter: ResultSubmitter::new(config)?,
            override_args,
        })
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Looks up the called tool and returns it with the validated arguments,
    /// without executing anything.
    pub fn prepare_arguments(
        &self,
        call: &ToolCall,
    ) -> Result<(Tool, Map<String, Value>), HandlerError> {
        let name = &call.function.name;
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.clone()))?;

        let mut args = parse_arguments(&call.function.arguments)?;
        if let Some(overrides) = &self.override_args {
            for (key, value) in overrides {
                args.insert(key.clone(), value.clone());
            }
        }

        Validator::new(tool.parameters.as_ref())
            .validate(&args)
            .map_err(ToolError::from)?;
        Ok((tool, args))
    }

    /// Runs a single call and submits the session with its result appended.
    pub async fn handle_tool_call(
        &self,
        call: &ToolCall,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> Result<ToolResult, HandlerError> {
        let output = self.execute_call(call, session).await?;
        self.submitter.submit(session, cancel).await?;

        info!(call_id = %call.id, "Tool call completed");
        Ok(ToolResult::ok(&call.id, output))
    }

    /// Everything up to submission: validate, execute and append the tool
    /// result message. Returns the tool output.
    async fn execute_call(&self, call: &ToolCall, session: &mut Session) -> Result<String, HandlerError> {
        if !call.is_function() {
            return Err(HandlerError::UnsupportedCallType(call.call_type.clone()));
        }
        info!(call_id = %call.id, tool = %call.function.name, "Handling tool call");

        let (tool, args) = self.prepare_arguments(call)?;
        debug!(call_id = %call.id, "Arguments validated");

        let output = self.executor.execute(&tool, &args).await?;
        debug!(call_id = %call.id, output_len = output.len(), "Tool executed");

        session.add_message(Message::new_tool_result(&call.id, output.clone()));
        Ok(output)
    }

    /// Processes the calls of the first assistant message that has any, in
    /// order. A failed call is reported in its result and does not stop the
    /// rest; cancellation does.
    ///
    /// A call that ran but could not be submitted keeps its output in
    /// `content` alongside the error.
    pub async fn process_session(
        &self,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> Vec<ToolResult> {
        let Some(message) = session.first_tool_call_message() else {
            debug!(thread_id = %session.thread_id, "No tool calls to process");
            return Vec::new();
        };
        let calls = message.tool_calls.clone();

        let mut results = Vec::with_capacity(calls.len());
        for (index, call) in calls.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(skipped = calls.len() - index, "Processing cancelled");
                break;
            }
            if !call.is_function() {
                debug!(call_id = %call.id, call_type = %call.call_type, "Skipping non-function tool call");
                continue;
            }

            let output = match self.execute_call(call, session).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(call_id = %call.id, tool = %call.function.name, error = %e, "Tool call failed");
                    results.push(ToolResult::error(&call.id, e.to_string()));
                    continue;
                }
            };

            match self.submitter.submit(session, cancel).await {
                Ok(()) => {
                    info!(call_id = %call.id, "Tool call completed");
                    results.push(ToolResult::ok(&call.id, output));
                }
                Err(e) => {
                    warn!(call_id = %call.id, error = %e, "Tool result was not submitted");
                    results.push(ToolResult::ok(&call.id, output).with_error(e.to_string()));
                }
            }
        }
        results
    }
}

impl fmt::Debug for ToolCallHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCallHandler")
            .field("registry", &self.registry)
            .field("submitter", &self.submitter)
            .field("override_args", &self.override_args)
            .finish()
    }
}
