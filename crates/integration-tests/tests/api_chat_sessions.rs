mod support;

use axum::http::{Method, StatusCode, header};
use serde_json::json;
use uuid::Uuid;

use support::api_app::{TEST_SYSTEM_PROMPT, build_test_router, simulator_config};
use support::{create_session, error_code, request, send_json};

#[tokio::test]
async fn new_session_starts_with_only_the_system_turn() {
    let app = build_test_router(simulator_config());

    let created = send_json(&app, request(Method::POST, "/v1/sessions", None)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["turn_count"], 1);
    assert_eq!(created.body["turns"], json!([]));
    assert_eq!(created.body["max_chars"], 6000);
    assert!(created.headers.contains_key("x-request-id"));

    let session_id = created.body["session_id"].as_str().expect("session id");
    let raw = send_json(
        &app,
        request(Method::GET, &format!("/v1/sessions/{session_id}?raw=true"), None),
    )
    .await;
    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.body["turns"][0]["role"], "system");
    assert_eq!(raw.body["turns"][0]["content"], TEST_SYSTEM_PROMPT);
}

#[tokio::test]
async fn simulator_reply_is_appended_after_user_turn() {
    let app = build_test_router(simulator_config());
    let session_id = create_session(&app).await;

    let submitted = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/sessions/{session_id}/messages"),
            Some(json!({"content": "hola"})),
        ),
    )
    .await;

    assert_eq!(submitted.status, StatusCode::OK);
    assert_eq!(submitted.body["outcome"]["kind"], "simulated");
    let turns = submitted.body["session"]["turns"]
        .as_array()
        .expect("turns should be an array");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[0]["content"], "hola");
    assert_eq!(turns[1]["role"], "assistant");
    assert!(
        turns[1]["content"]
            .as_str()
            .is_some_and(|content| content.starts_with("(SIMULATOR)"))
    );
}

#[tokio::test]
async fn blank_message_is_rejected_and_history_is_untouched() {
    let app = build_test_router(simulator_config());
    let session_id = create_session(&app).await;

    let submitted = send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/sessions/{session_id}/messages"),
            Some(json!({"content": "   \n"})),
        ),
    )
    .await;
    assert_eq!(submitted.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&submitted.body), Some("empty_message"));

    let session = send_json(
        &app,
        request(Method::GET, &format!("/v1/sessions/{session_id}"), None),
    )
    .await;
    assert_eq!(session.body["turn_count"], 1);
}

#[tokio::test]
async fn clear_resets_history_to_system_turn() {
    let app = build_test_router(simulator_config());
    let session_id = create_session(&app).await;

    for content in ["uno", "dos"] {
        let submitted = send_json(
            &app,
            request(
                Method::POST,
                &format!("/v1/sessions/{session_id}/messages"),
                Some(json!({"content": content})),
            ),
        )
        .await;
        assert_eq!(submitted.status, StatusCode::OK);
    }

    let cleared = send_json(
        &app,
        request(Method::POST, &format!("/v1/sessions/{session_id}/clear"), None),
    )
    .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["turn_count"], 1);
    assert_eq!(cleared.body["turns"], json!([]));
}

#[tokio::test]
async fn export_returns_pretty_json_attachment() {
    let app = build_test_router(simulator_config());
    let session_id = create_session(&app).await;
    send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/sessions/{session_id}/messages"),
            Some(json!({"content": "¿qué tal?"})),
        ),
    )
    .await;

    let exported = send_json(
        &app,
        request(Method::GET, &format!("/v1/sessions/{session_id}/export"), None),
    )
    .await;

    assert_eq!(exported.status, StatusCode::OK);
    let disposition = exported
        .headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .expect("export should be an attachment");
    assert!(disposition.contains("chat_history.json"));

    let records = exported.body.as_array().expect("export should be an array");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["role"], "system");
    assert_eq!(records[1]["content"], "¿qué tal?");
    assert!(records.iter().all(|record| record["time"].is_string()));
    assert!(records.iter().all(|record| record.get("timestamp").is_none()));
}

#[tokio::test]
async fn sessions_are_isolated_from_each_other() {
    let app = build_test_router(simulator_config());
    let first = create_session(&app).await;
    let second = create_session(&app).await;

    send_json(
        &app,
        request(
            Method::POST,
            &format!("/v1/sessions/{first}/messages"),
            Some(json!({"content": "solo en la primera"})),
        ),
    )
    .await;

    let second_view = send_json(
        &app,
        request(Method::GET, &format!("/v1/sessions/{second}"), None),
    )
    .await;
    assert_eq!(second_view.body["turn_count"], 1);
}

#[tokio::test]
async fn deleted_and_unknown_sessions_return_not_found() {
    let app = build_test_router(simulator_config());
    let session_id = create_session(&app).await;

    let deleted = send_json(
        &app,
        request(Method::DELETE, &format!("/v1/sessions/{session_id}"), None),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({"ok": true}));

    for path in [
        format!("/v1/sessions/{session_id}"),
        format!("/v1/sessions/{}", Uuid::new_v4()),
        "/v1/sessions/not-a-uuid".to_string(),
    ] {
        let missing = send_json(&app, request(Method::GET, &path, None)).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&missing.body), Some("not_found"));
    }
}

#[tokio::test]
async fn status_reports_simulator_mode_without_secrets() {
    let app = build_test_router(simulator_config());

    let status = send_json(&app, request(Method::GET, "/v1/status", None)).await;

    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["simulator_mode"], true);
    assert_eq!(status.body["serialization_mode"], "message-list");
    assert_eq!(status.body["default_max_chars"], 6000);
    assert!(status.body.get("api_key").is_none());

    let health = send_json(&app, request(Method::GET, "/healthz", None)).await;
    assert_eq!(health.body, json!({"ok": true}));
}
