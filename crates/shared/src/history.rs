use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and concise conversational assistant. \
Reply in Spanish unless another language is requested.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HistoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(HistoryError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("the system turn is seeded by the history and cannot be appended")]
    SystemTurnReserved,
}

/// One message of a conversation. `time` is the export field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub time: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            time: Utc::now(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Timestamp-less `{role, content}` record as sent to the vendor endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl From<&Turn> for ApiMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

/// Conversation log owned by a single session.
///
/// Always starts with exactly one system turn seeded from `system_prompt`.
#[derive(Debug, Clone)]
pub struct History {
    system_prompt: String,
    turns: Vec<Turn>,
}

impl History {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let turns = vec![Turn::new(Role::System, system_prompt.clone())];
        Self {
            system_prompt,
            turns,
        }
    }

    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<String>,
    ) -> Result<&Turn, HistoryError> {
        if role == Role::System {
            return Err(HistoryError::SystemTurnReserved);
        }

        self.turns.push(Turn::new(role, content));
        Ok(&self.turns[self.turns.len() - 1])
    }

    pub fn append_labeled(
        &mut self,
        role_label: &str,
        content: impl Into<String>,
    ) -> Result<&Turn, HistoryError> {
        let role = role_label.parse::<Role>()?;
        self.append(role, content)
    }

    pub fn reset(&mut self) {
        self.turns = vec![Turn::new(Role::System, self.system_prompt.clone())];
    }

    pub fn as_api_messages(&self) -> Vec<ApiMessage> {
        self.turns.iter().map(ApiMessage::from).collect()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.turns)
    }
}
