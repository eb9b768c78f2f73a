use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use shared::models::{OkResponse, StatusResponse};

use super::AppState;

pub(super) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(OkResponse { ok: true }))
}

pub(super) async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.engine.config();
    (
        StatusCode::OK,
        Json(StatusResponse {
            simulator_mode: state.engine.simulator_mode(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            serialization_mode: config.serialization_mode,
            default_max_chars: config.max_history_chars,
        }),
    )
}
