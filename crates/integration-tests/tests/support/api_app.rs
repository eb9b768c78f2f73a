use std::sync::Arc;

use api_server::http::{AppState, build_router};
use shared::chat::ChatEngine;
use shared::config::ChatConfig;

pub const TEST_API_KEY: &str = "integration-test-chat-key";
pub const TEST_SYSTEM_PROMPT: &str = "You are a test assistant.";

pub fn simulator_config() -> ChatConfig {
    ChatConfig {
        api_key: None,
        system_prompt: TEST_SYSTEM_PROMPT.to_string(),
        ..ChatConfig::default()
    }
}

pub fn live_config(endpoint: String) -> ChatConfig {
    ChatConfig {
        api_key: Some(TEST_API_KEY.to_string()),
        endpoint,
        model: "integration-model".to_string(),
        timeout_ms: 5_000,
        system_prompt: TEST_SYSTEM_PROMPT.to_string(),
        ..ChatConfig::default()
    }
}

pub fn build_test_router(config: ChatConfig) -> axum::Router {
    let engine = ChatEngine::from_config(config).expect("chat engine should build");
    build_router(AppState::new(Arc::new(engine)))
}
