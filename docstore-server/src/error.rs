use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docstore::error::Error as DocError;
use serde_json::json;

/// Wraps `docstore::error::Error` so it can be returned directly from axum
/// handlers. Maps each kind to the status codes fixed by the HTTP surface
/// and logs at the level the error kind warrants before converting.
pub struct ApiError(pub DocError);

impl From<DocError> for ApiError {
    fn from(err: DocError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, log_level_warn) = match &self.0 {
            DocError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string(), false),
            DocError::Conflict(msg) => (StatusCode::CONFLICT, format!("conflict: {msg}"), true),
            DocError::InvalidPayload(msg) => {
                (StatusCode::BAD_REQUEST, format!("invalid payload: {msg}"), true)
            }
            DocError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), true),
            DocError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout".to_string(), true),
            DocError::Io(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), false),
        };

        if log_level_warn {
            log::warn!("request failed: {}", self.0);
        } else if status.is_server_error() {
            log::error!("request failed: {}", self.0);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Fallback for panics/unexpected conditions the handler layer catches
/// explicitly: a fixed generic body, never the underlying `Display`, since
/// an unclassified failure may carry internal detail unsafe to leak.
pub fn internal_error() -> Response {
    log::error!("unhandled internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" }))).into_response()
}
