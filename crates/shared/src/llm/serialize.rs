use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::history::ApiMessage;

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

const PROBE_MAX_TOKENS: u32 = 10;
const PROBE_PROMPT: &str = "ping";

/// How the conversation is encoded in the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SerializationMode {
    /// `messages: [{role, content}, ...]`
    #[default]
    MessageList,
    /// `input: "[SYSTEM]: ...\n\n[USER]: ..."`
    FlattenedText,
}

impl SerializationMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessageList => "message-list",
            Self::FlattenedText => "flattened-text",
        }
    }
}

impl fmt::Display for SerializationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown serialization mode: {0}")]
pub struct UnknownSerializationMode(pub String);

impl FromStr for SerializationMode {
    type Err = UnknownSerializationMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "message-list" | "messages" => Ok(Self::MessageList),
            "flattened-text" | "text" => Ok(Self::FlattenedText),
            _ => Err(UnknownSerializationMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequestOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ChatRequestOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

pub fn build_request_body(
    mode: SerializationMode,
    messages: &[ApiMessage],
    options: &ChatRequestOptions,
) -> Value {
    match mode {
        SerializationMode::MessageList => json!({
            "model": options.model,
            "messages": messages,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        }),
        SerializationMode::FlattenedText => json!({
            "model": options.model,
            "input": flatten_messages(messages),
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        }),
    }
}

pub fn probe_request_body(model: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": PROBE_PROMPT }],
        "max_tokens": PROBE_MAX_TOKENS,
    })
}

pub fn flatten_messages(messages: &[ApiMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("[{}]: {}", role_label(&message.role), message.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn role_label(role: &str) -> &'static str {
    match role.trim().to_ascii_uppercase().as_str() {
        "SYSTEM" => "SYSTEM",
        "ASSISTANT" => "ASSISTANT",
        _ => "USER",
    }
}
