use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::chat::SubmitError;
use shared::models::{
    ProbeEndpointRequest, SubmitMessageRequest, SubmitMessageResponse,
    UpdateSessionSettingsRequest,
};
use tracing::{info, warn};

use super::AppState;
use super::errors::{bad_request_response, internal_error_response};
use super::sessions::{lookup_session, session_view};

pub(super) async fn submit_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitMessageRequest>,
) -> Response {
    let (session_id, session) = match lookup_session(&state, &session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let mut session = session.lock().await;
    let outcome = match state.engine.submit(&mut session, &req.content).await {
        Ok(outcome) => outcome,
        Err(SubmitError::EmptyInput) => {
            return bad_request_response("empty_message", "Message must not be empty");
        }
        Err(err) => return internal_error_response(&err.to_string()),
    };

    if outcome.kind.is_failure() {
        warn!(session_id = %session_id, kind = ?outcome.kind, "chat reply recorded as error turn");
    } else {
        info!(session_id = %session_id, kind = ?outcome.kind, "chat reply recorded");
    }

    (
        StatusCode::OK,
        Json(SubmitMessageResponse {
            outcome,
            session: session_view(session_id, &session, false),
        }),
    )
        .into_response()
}

pub(super) async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let (session_id, session) = match lookup_session(&state, &session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let mut session = session.lock().await;
    session.clear();
    info!(session_id = %session_id, "chat history cleared");

    (StatusCode::OK, Json(session_view(session_id, &session, false))).into_response()
}

pub(super) async fn update_settings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSessionSettingsRequest>,
) -> Response {
    let (session_id, session) = match lookup_session(&state, &session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let mut session = session.lock().await;
    if let Some(endpoint) = req.endpoint_override
        && let Err(err) = session.set_endpoint_override(Some(endpoint))
    {
        return bad_request_response("invalid_endpoint", &err.to_string());
    }
    if let Some(max_chars) = req.max_chars {
        session.set_max_chars(max_chars);
    }

    info!(
        session_id = %session_id,
        max_chars = session.max_chars(),
        endpoint_override = session.endpoint_override().is_some(),
        "chat session settings updated"
    );

    (StatusCode::OK, Json(session_view(session_id, &session, false))).into_response()
}

pub(super) async fn probe_endpoint(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<ProbeEndpointRequest>,
) -> Response {
    let (_, session) = match lookup_session(&state, &session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let requested = req
        .endpoint
        .map(|endpoint| endpoint.trim().to_string())
        .filter(|endpoint| !endpoint.is_empty());
    let endpoint = match requested {
        Some(endpoint) => Some(endpoint),
        None => session
            .lock()
            .await
            .endpoint_override()
            .map(ToString::to_string),
    };

    let report = state.engine.probe(endpoint.as_deref()).await;
    (StatusCode::OK, Json(report)).into_response()
}
