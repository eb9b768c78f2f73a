use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::chat::ChatSession;
use shared::config::DEFAULT_SESSION_TTL_SECONDS;
use shared::history::Role;
use shared::models::{OkResponse, SessionView};
use tracing::info;
use uuid::Uuid;

use super::AppState;
use super::errors::session_not_found_response;

pub(super) type SharedSession = Arc<tokio::sync::Mutex<ChatSession>>;

pub const DEFAULT_SESSION_IDLE_TTL: Duration =
    Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS);

struct SessionEntry {
    session: SharedSession,
    last_used: Instant,
}

/// Live chat sessions keyed by id. Each session carries its own async lock so one
/// interaction finishes before the next one on the same session starts. Sessions
/// idle for longer than `idle_ttl` are discarded.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub fn spawn_pruner(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = registry.prune_idle_at(Instant::now());
                if evicted > 0 {
                    info!(
                        evicted,
                        live_sessions = registry.len(),
                        "idle chat sessions discarded"
                    );
                }
            }
        })
    }

    pub fn insert(&self, session: ChatSession) -> Uuid {
        self.insert_at(session, Instant::now())
    }

    fn insert_at(&self, session: ChatSession, now: Instant) -> Uuid {
        self.prune_idle_at(now);

        let session_id = Uuid::new_v4();
        self.sessions
            .lock()
            .expect("session registry mutex should not be poisoned")
            .insert(
                session_id,
                SessionEntry {
                    session: Arc::new(tokio::sync::Mutex::new(session)),
                    last_used: now,
                },
            );
        session_id
    }

    pub(super) fn get(&self, session_id: Uuid) -> Option<SharedSession> {
        self.get_at(session_id, Instant::now())
    }

    fn get_at(&self, session_id: Uuid, now: Instant) -> Option<SharedSession> {
        let mut sessions = self
            .sessions
            .lock()
            .expect("session registry mutex should not be poisoned");

        let entry = sessions.get_mut(&session_id)?;
        if is_idle(entry, now, self.idle_ttl) {
            sessions.remove(&session_id);
            return None;
        }

        entry.last_used = now;
        Some(Arc::clone(&entry.session))
    }

    pub fn remove(&self, session_id: Uuid) -> bool {
        self.sessions
            .lock()
            .expect("session registry mutex should not be poisoned")
            .remove(&session_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session registry mutex should not be poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self
            .sessions
            .lock()
            .expect("session registry prune mutex should not be poisoned");

        let before = sessions.len();
        sessions.retain(|_, entry| !is_idle(entry, now, self.idle_ttl));
        before - sessions.len()
    }
}

fn is_idle(entry: &SessionEntry, now: Instant, idle_ttl: Duration) -> bool {
    now.saturating_duration_since(entry.last_used) > idle_ttl
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SessionViewQuery {
    #[serde(default)]
    raw: bool,
}

pub(super) async fn create_session(State(state): State<AppState>) -> Response {
    let session = state.engine.new_session();
    let view_source = session.clone();
    let session_id = state.sessions.insert(session);
    info!(session_id = %session_id, live_sessions = state.sessions.len(), "chat session created");

    (
        StatusCode::CREATED,
        Json(session_view(session_id, &view_source, false)),
    )
        .into_response()
}

pub(super) async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<SessionViewQuery>,
) -> Response {
    let (session_id, session) = match lookup_session(&state, &session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let session = session.lock().await;
    (
        StatusCode::OK,
        Json(session_view(session_id, &session, query.raw)),
    )
        .into_response()
}

pub(super) async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Ok(session_id) = Uuid::parse_str(&session_id) else {
        return session_not_found_response();
    };

    if state.sessions.remove(session_id) {
        info!(session_id = %session_id, "chat session discarded");
        return (StatusCode::OK, Json(OkResponse { ok: true })).into_response();
    }

    session_not_found_response()
}

pub(super) fn lookup_session(
    state: &AppState,
    raw_session_id: &str,
) -> Result<(Uuid, SharedSession), Response> {
    let session_id =
        Uuid::parse_str(raw_session_id).map_err(|_| session_not_found_response())?;
    state
        .sessions
        .get(session_id)
        .map(|session| (session_id, session))
        .ok_or_else(session_not_found_response)
}

/// The system turn is only shown when `include_system` is set.
pub(super) fn session_view(
    session_id: Uuid,
    session: &ChatSession,
    include_system: bool,
) -> SessionView {
    let history = session.history();
    SessionView {
        session_id,
        max_chars: session.max_chars(),
        endpoint_override: session.endpoint_override().map(ToString::to_string),
        turn_count: history.len(),
        turns: history
            .turns()
            .iter()
            .filter(|turn| include_system || turn.role != Role::System)
            .cloned()
            .collect(),
    }
}
