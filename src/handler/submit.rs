use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{HandlerConfig, HandlerError, TransportError};
use crate::session::{Message, Session};

/// Body posted to the agent server after each tool call.
#[derive(Debug, Serialize)]
pub struct SubmissionEnvelope<'a> {
    pub thread_id: &'a str,
    pub run_id: &'a str,
    pub messages: &'a [Message],
    pub state: Map<String, Value>,
    pub tools: Vec<Value>,
    pub context: Vec<Value>,
    pub forwarded_props: Map<String, Value>,
}

impl<'a> SubmissionEnvelope<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            thread_id: &session.thread_id,
            run_id: &session.run_id,
            messages: &session.messages,
            state: Map::new(),
            tools: Vec::new(),
            context: Vec::new(),
            forwarded_props: Map::new(),
        }
    }
}

/// Posts session state to the agent server, retrying failed attempts with a
/// fixed delay.
#[derive(Debug, Clone)]
pub struct ResultSubmitter {
    client: Client,
    url: String,
    attempts: u32,
    delay: Duration,
}

impl ResultSubmitter {
    /// Creates a submitter from `config`.
    pub fn new(config: &HandlerConfig) -> Result<Self, HandlerError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HandlerError::InvalidConfig(format!("invalid header name '{name}': {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                HandlerError::InvalidConfig(format!("invalid value for header '{name}': {e}"))
            })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(HandlerError::Client)?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
            attempts: config.retry_attempts.max(1),
            delay: config.retry_delay,
        })
    }

    /// The URL results are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Submits `session`.
    ///
    /// Transport failures and non-200 responses are retried. `cancel` is
    /// observed while waiting between attempts; a request already in flight
    /// runs to completion.
    pub async fn submit(
        &self,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<(), HandlerError> {
        let body = serde_json::to_vec(&SubmissionEnvelope::new(session))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(body.clone()).await {
                Ok(()) => {
                    debug!(url = %self.url, attempt, "Tool result submitted");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        url = %self.url,
                        attempt,
                        max_attempts = self.attempts,
                        error = %e,
                        "Tool result submission failed"
                    );
                    if attempt >= self.attempts {
                        return Err(HandlerError::SubmissionFailed {
                            attempts: attempt,
                            last: e,
                        });
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(HandlerError::Cancelled { attempts: attempt });
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }

    async fn send_once(&self, body: Vec<u8>) -> Result<(), TransportError> {
        let response = self.client.post(&self.url).body(body).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(())
    }
}
