#![allow(dead_code)]

pub mod api_app;
pub mod upstream_mock;

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct JsonResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse {
        status,
        headers,
        body,
    }
}

pub fn request(method: Method, path: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::ACCEPT, "application/json");

    let request_body = body
        .map(|value| {
            serde_json::to_vec(&value).expect("json body should serialize for integration request")
        })
        .unwrap_or_default();
    if !request_body.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }

    builder
        .body(Body::from(request_body))
        .expect("integration request should build")
}

pub fn error_code(body: &Value) -> Option<&str> {
    body.get("error")?.get("code")?.as_str()
}

pub async fn create_session(app: &axum::Router) -> String {
    let created = send_json(app, request(Method::POST, "/v1/sessions", None)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    created.body["session_id"]
        .as_str()
        .expect("session id should be a string")
        .to_string()
}
