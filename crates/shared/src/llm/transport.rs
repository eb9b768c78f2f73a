use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

/// Raw outcome of a completed HTTP exchange, whatever its status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub text: String,
    pub json: Option<Value>,
}

impl TransportResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        let json = serde_json::from_str(&text).ok();
        Self { status, text, json }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The exchange never produced a status line.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
}

pub trait ChatTransport: Send + Sync {
    fn post_json<'a>(&'a self, endpoint: &'a str, body: &'a Value) -> TransportFuture<'a>;
}

#[derive(Debug, Error)]
pub enum TransportConfigError {
    #[error("failed to build chat http client: {0}")]
    HttpClient(String),
}

/// reqwest-backed transport that authenticates with a bearer token.
#[derive(Clone)]
pub struct HttpChatTransport {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl HttpChatTransport {
    pub fn new(api_key: Option<String>, timeout_ms: u64) -> Result<Self, TransportConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| TransportConfigError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    async fn send(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.post(endpoint).json(body);
        if let Some(api_key) = self.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_send_error)?;

        Ok(TransportResponse::new(status, text))
    }
}

impl std::fmt::Debug for HttpChatTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatTransport")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ChatTransport for HttpChatTransport {
    fn post_json<'a>(&'a self, endpoint: &'a str, body: &'a Value) -> TransportFuture<'a> {
        Box::pin(self.send(endpoint, body))
    }
}

fn map_send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpChatTransport, TransportResponse};

    #[test]
    fn response_parses_json_bodies_when_possible() {
        let json_response = TransportResponse::new(200, r#"{"text":"ok"}"#);
        assert!(json_response.is_success());
        assert_eq!(
            json_response.json.as_ref().and_then(|value| value["text"].as_str()),
            Some("ok")
        );

        let text_response = TransportResponse::new(404, "not found");
        assert!(!text_response.is_success());
        assert!(text_response.json.is_none());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let transport = HttpChatTransport::new(Some("secret-key".to_string()), 1_000)
            .expect("client should build");
        let rendered = format!("{transport:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
