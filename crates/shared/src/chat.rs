use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ChatConfig, ConfigError, validate_endpoint};
use crate::history::{ApiMessage, History, HistoryError, Role};
use crate::llm::{
    ChatTransport, ERROR_BODY_EXCERPT_MAX_CHARS, HttpChatTransport, PROBE_BODY_EXCERPT_MAX_CHARS,
    RESPONSE_FALLBACK_MAX_CHARS, TransportConfigError, TransportResponse, build_request_body,
    cap_chars, extract_reply, probe_request_body, truncate_history,
};

pub const SIMULATOR_MARKER: &str = "(SIMULATOR)";
pub const CONNECTION_ERROR_MARKER: &str = "[CONNECTION ERROR]";
pub const API_ERROR_PREFIX: &str = "**(API error)**:";
const SIMULATOR_ECHO_MAX_CHARS: usize = 200;

/// Per-session chat state, created on session start and dropped with the session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: History,
    max_chars: i64,
    endpoint_override: Option<String>,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>, max_chars: i64) -> Self {
        Self {
            history: History::new(system_prompt),
            max_chars,
            endpoint_override: None,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.system_prompt.clone(), config.max_history_chars)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn max_chars(&self) -> i64 {
        self.max_chars
    }

    pub fn set_max_chars(&mut self, max_chars: i64) {
        self.max_chars = max_chars;
    }

    pub fn endpoint_override(&self) -> Option<&str> {
        self.endpoint_override.as_deref()
    }

    pub fn set_endpoint_override(&mut self, endpoint: Option<String>) -> Result<(), ConfigError> {
        let endpoint = endpoint
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if let Some(endpoint) = endpoint.as_deref() {
            validate_endpoint(endpoint)?;
        }

        self.endpoint_override = endpoint;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.history.reset();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Reply,
    Simulated,
    ConnectionError,
    HttpError,
}

impl OutcomeKind {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::ConnectionError | Self::HttpError)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub kind: OutcomeKind,
    /// Content of the assistant turn appended to the history.
    pub reply: String,
    /// Failure detail suitable for a sidebar; `None` on success.
    pub diagnostic: Option<String>,
    pub sent_turns: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message must not be empty")]
    EmptyInput,
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub endpoint: String,
    pub status: Option<u16>,
    pub body_excerpt: Option<String>,
    pub error: Option<String>,
}

/// Drives one interaction: append, trim, serialize, call, decode, append.
#[derive(Clone)]
pub struct ChatEngine {
    config: ChatConfig,
    transport: Arc<dyn ChatTransport>,
}

impl ChatEngine {
    pub fn new(config: ChatConfig, transport: Arc<dyn ChatTransport>) -> Self {
        Self { config, transport }
    }

    pub fn from_config(config: ChatConfig) -> Result<Self, TransportConfigError> {
        let transport = HttpChatTransport::new(config.api_key.clone(), config.timeout_ms)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn simulator_mode(&self) -> bool {
        self.config.simulator_mode()
    }

    pub fn new_session(&self) -> ChatSession {
        ChatSession::from_config(&self.config)
    }

    /// Runs one user submission against `session`.
    ///
    /// Blank input is rejected without touching the history. Every other path ends
    /// with exactly one assistant turn, including transport and HTTP failures.
    pub async fn submit(
        &self,
        session: &mut ChatSession,
        input: &str,
    ) -> Result<SubmitOutcome, SubmitError> {
        if input.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        session.history.append(Role::User, input)?;

        if self.simulator_mode() {
            let reply = format!(
                "{SIMULATOR_MARKER} Received: {}. Reply as a Spanish-speaking assistant.",
                cap_chars(input, SIMULATOR_ECHO_MAX_CHARS)
            );
            session.history.append(Role::Assistant, reply.clone())?;
            info!(turns = session.history.len(), "simulator reply appended");

            return Ok(SubmitOutcome {
                kind: OutcomeKind::Simulated,
                reply,
                diagnostic: None,
                sent_turns: 0,
            });
        }

        let window = truncate_history(session.history.turns(), session.max_chars);
        let messages = window.iter().map(ApiMessage::from).collect::<Vec<_>>();
        let body = build_request_body(
            self.config.serialization_mode,
            &messages,
            &self.config.request_options(),
        );
        let endpoint = self.endpoint_for(session);

        info!(
            endpoint = %endpoint,
            serialization_mode = %self.config.serialization_mode,
            sent_turns = messages.len(),
            history_turns = session.history.len(),
            "sending chat request"
        );

        let (kind, message) = match self.transport.post_json(&endpoint, &body).await {
            Err(err) => {
                warn!(endpoint = %endpoint, error = %err, "chat request did not complete");
                (
                    OutcomeKind::ConnectionError,
                    format!("{CONNECTION_ERROR_MARKER} {err}"),
                )
            }
            Ok(response) if !response.is_success() => {
                warn!(
                    endpoint = %endpoint,
                    status = response.status,
                    "chat endpoint returned an error status"
                );
                (OutcomeKind::HttpError, http_error_message(&endpoint, &response))
            }
            Ok(response) => (OutcomeKind::Reply, decode_success(&response)),
        };

        let outcome = if kind.is_failure() {
            SubmitOutcome {
                kind,
                reply: format!("{API_ERROR_PREFIX} {message}"),
                diagnostic: Some(message),
                sent_turns: messages.len(),
            }
        } else {
            SubmitOutcome {
                kind,
                reply: message,
                diagnostic: None,
                sent_turns: messages.len(),
            }
        };
        session
            .history
            .append(Role::Assistant, outcome.reply.clone())?;

        Ok(outcome)
    }

    /// Sends a minimal request to check that the endpoint answers at all.
    pub async fn probe(&self, endpoint_override: Option<&str>) -> ProbeReport {
        let endpoint = endpoint_override
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.config.endpoint.as_str())
            .to_string();

        if let Err(err) = validate_endpoint(&endpoint) {
            return ProbeReport {
                endpoint,
                status: None,
                body_excerpt: None,
                error: Some(err.to_string()),
            };
        }

        let body = probe_request_body(&self.config.model);
        match self.transport.post_json(&endpoint, &body).await {
            Ok(response) => {
                info!(endpoint = %endpoint, status = response.status, "endpoint probe completed");
                ProbeReport {
                    endpoint,
                    status: Some(response.status),
                    body_excerpt: Some(cap_chars(&response.text, PROBE_BODY_EXCERPT_MAX_CHARS)),
                    error: None,
                }
            }
            Err(err) => {
                warn!(endpoint = %endpoint, error = %err, "endpoint probe failed");
                ProbeReport {
                    endpoint,
                    status: None,
                    body_excerpt: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    fn endpoint_for(&self, session: &ChatSession) -> String {
        session
            .endpoint_override()
            .unwrap_or(self.config.endpoint.as_str())
            .to_string()
    }
}

fn decode_success(response: &TransportResponse) -> String {
    match response.json.as_ref() {
        Some(payload) => extract_reply(payload),
        None => cap_chars(&response.text, RESPONSE_FALLBACK_MAX_CHARS),
    }
}

fn http_error_message(endpoint: &str, response: &TransportResponse) -> String {
    format!(
        "[HTTP {}] Error calling the endpoint.\nURL: {endpoint}\nResponse (partial): {}",
        response.status,
        cap_chars(&response.text, ERROR_BODY_EXCERPT_MAX_CHARS)
    )
}
