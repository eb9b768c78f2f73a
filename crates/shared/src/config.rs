use std::fmt;

use thiserror::Error;
use url::Url;

use crate::config_env::{
    first_trimmed_env, optional_trimmed_env, parse_f64_env, parse_i64_env, parse_u32_env,
    parse_u64_env,
};
use crate::history::DEFAULT_SYSTEM_PROMPT;
use crate::llm::{
    ChatRequestOptions, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, SerializationMode,
};

pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/v1/generate";
pub const DEFAULT_MAX_HISTORY_CHARS: i64 = 6000;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 3_600;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Clone)]
pub struct ChatConfig {
    /// Absent means simulator mode.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_ms: u64,
    pub max_history_chars: i64,
    pub serialization_mode: SerializationMode,
    pub system_prompt: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// Sessions untouched for this long are discarded.
    pub session_ttl_seconds: u64,
    pub chat: ChatConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid number in env var {0}")]
    ParseFloat(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = first_trimmed_env(&["CHAT_ENDPOINT", "GROQ_ENDPOINT"])
            .unwrap_or_else(|| DEFAULT_CHAT_ENDPOINT.to_string());
        validate_endpoint(&endpoint)?;

        let serialization_mode = match optional_trimmed_env("CHAT_SERIALIZATION_MODE") {
            Some(raw) => raw.parse::<SerializationMode>().map_err(|err| {
                ConfigError::InvalidConfiguration(format!("CHAT_SERIALIZATION_MODE: {err}"))
            })?,
            None => SerializationMode::default(),
        };

        Ok(Self {
            api_key: first_trimmed_env(&["CHAT_API_KEY", "GROQ_API_KEY"]),
            endpoint,
            model: optional_trimmed_env("CHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_u32_env("CHAT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            temperature: parse_f64_env("CHAT_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            timeout_ms: parse_u64_env("CHAT_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            max_history_chars: parse_i64_env("CHAT_MAX_HISTORY_CHARS", DEFAULT_MAX_HISTORY_CHARS)?,
            serialization_mode,
            system_prompt: optional_trimmed_env("CHAT_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    pub fn simulator_mode(&self) -> bool {
        self.api_key.is_none()
    }

    pub fn request_options(&self) -> ChatRequestOptions {
        ChatRequestOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_history_chars: DEFAULT_MAX_HISTORY_CHARS,
            serialization_mode: SerializationMode::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_history_chars", &self.max_history_chars)
            .field("serialization_mode", &self.serialization_mode)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_ttl_seconds =
            parse_u64_env("CHAT_SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECONDS)?;
        if session_ttl_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "CHAT_SESSION_TTL_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            session_ttl_seconds,
            chat: ChatConfig::from_env()?,
        })
    }
}

pub fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(endpoint).map_err(|_| {
        ConfigError::InvalidConfiguration(format!("endpoint is not a valid URL: {endpoint}"))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidConfiguration(
            "endpoint must start with http:// or https://".to_string(),
        )),
    }
}
