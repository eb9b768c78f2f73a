use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_server::http;
use shared::chat::ChatEngine;
use shared::config::ApiConfig;
use tracing::{error, info, warn};

const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("failed to load .env file: {err}");
    }

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "api_server=debug,shared=info,axum=info,tower_http=info".to_string()
        }))
        .init();

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    if config.chat.simulator_mode() {
        warn!("no chat api key configured; replies will come from the simulator");
    }

    let engine = match ChatEngine::from_config(config.chat.clone()) {
        Ok(engine) => engine,
        Err(err) => {
            error!("failed to build chat engine: {err}");
            std::process::exit(1);
        }
    };

    info!(
        endpoint = %config.chat.endpoint,
        model = %config.chat.model,
        serialization_mode = %config.chat.serialization_mode,
        max_history_chars = config.chat.max_history_chars,
        "chat engine configured"
    );

    let session_ttl = Duration::from_secs(config.session_ttl_seconds);
    let sessions = http::SessionRegistry::new(session_ttl);
    let _pruner = sessions.spawn_pruner(session_ttl.min(SESSION_PRUNE_INTERVAL));
    info!(
        session_ttl_seconds = config.session_ttl_seconds,
        "idle session eviction enabled"
    );

    let app = http::build_router(http::AppState::with_sessions(Arc::new(engine), sessions));

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:8080".parse().expect("valid default bind addr"));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind should succeed");

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    axum::serve(listener, app).await.expect("server should run");
}
