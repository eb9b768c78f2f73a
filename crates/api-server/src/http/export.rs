use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::AppState;
use super::errors::internal_error_response;
use super::sessions::lookup_session;

const EXPORT_FILE_NAME: &str = "chat_history.json";

pub(super) async fn export_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let (_, session) = match lookup_session(&state, &session_id) {
        Ok(found) => found,
        Err(response) => return response,
    };

    let exported = match session.lock().await.history().export_json() {
        Ok(exported) => exported,
        Err(err) => return internal_error_response(&err.to_string()),
    };

    let mut response = (StatusCode::OK, exported).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{EXPORT_FILE_NAME}\""))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    response
}
