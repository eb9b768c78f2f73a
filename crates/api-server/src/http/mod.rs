use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use shared::chat::ChatEngine;

mod chat;
mod errors;
mod export;
mod health;
mod observability;
mod sessions;

pub use sessions::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(engine: Arc<ChatEngine>) -> Self {
        Self::with_sessions(engine, SessionRegistry::default())
    }

    pub fn with_sessions(engine: Arc<ChatEngine>, sessions: SessionRegistry) -> Self {
        Self { engine, sessions }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/status", get(health::status))
        .route("/v1/sessions", post(sessions::create_session))
        .route(
            "/v1/sessions/{session_id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/v1/sessions/{session_id}/messages",
            post(chat::submit_message),
        )
        .route("/v1/sessions/{session_id}/clear", post(chat::clear_history))
        .route(
            "/v1/sessions/{session_id}/settings",
            put(chat::update_settings),
        )
        .route("/v1/sessions/{session_id}/probe", post(chat::probe_endpoint))
        .route("/v1/sessions/{session_id}/export", get(export::export_history))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .with_state(app_state)
}
