use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub body: String,
}

impl MockReply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamState {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    pub seen_paths: Arc<Mutex<Vec<String>>>,
    pub seen_bodies: Arc<Mutex<Vec<Value>>>,
    pub seen_auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

pub struct MockUpstream {
    pub base_url: String,
    pub state: UpstreamState,
    shutdown_tx: oneshot::Sender<()>,
    server_task: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start(replies: Vec<MockReply>) -> Self {
        let state = UpstreamState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen_paths: Arc::new(Mutex::new(Vec::new())),
            seen_bodies: Arc::new(Mutex::new(Vec::new())),
            seen_auth_headers: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/v1/generate", post(generate_handler))
            .route("/openai/v1/chat/completions", post(chat_completions_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("listener address should resolve");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            server.await.expect("mock upstream should run");
        });

        Self {
            base_url: format!("http://{local_addr}"),
            state,
            shutdown_tx,
            server_task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn stop(self) {
        self.shutdown_tx
            .send(())
            .expect("shutdown signal should send");
        self.server_task.await.expect("server task should join");
    }
}

async fn generate_handler(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, String) {
    record_and_reply(state, "/v1/generate", headers, payload).await
}

async fn chat_completions_handler(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, String) {
    record_and_reply(state, "/openai/v1/chat/completions", headers, payload).await
}

async fn record_and_reply(
    state: UpstreamState,
    path: &str,
    headers: HeaderMap,
    payload: Value,
) -> (StatusCode, String) {
    state.seen_paths.lock().await.push(path.to_string());
    state.seen_bodies.lock().await.push(payload);
    state.seen_auth_headers.lock().await.push(
        headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .map(ToString::to_string),
    );

    let reply = state.replies.lock().await.pop_front().unwrap_or(MockReply {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: json!({"error": {"code": "exhausted_test_replies"}}).to_string(),
    });

    (reply.status, reply.body)
}
