use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::SubmitOutcome;
use crate::history::Turn;
use crate::llm::SerializationMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub simulator_mode: bool,
    pub endpoint: String,
    pub model: String,
    pub serialization_mode: SerializationMode,
    pub default_max_chars: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub max_chars: i64,
    #[serde(default)]
    pub endpoint_override: Option<String>,
    /// Includes the system turn.
    pub turn_count: usize,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitMessageResponse {
    pub outcome: SubmitOutcome,
    pub session: SessionView,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionSettingsRequest {
    #[serde(default)]
    pub max_chars: Option<i64>,
    /// An empty string removes the override.
    #[serde(default)]
    pub endpoint_override: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeEndpointRequest {
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
