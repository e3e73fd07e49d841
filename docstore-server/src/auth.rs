use std::sync::Arc;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use docstore::error::Error as DocError;
use crate::error::ApiError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Rejects any request whose `Authorization` header does not carry one of
/// the configured bearer tokens. Applied as middleware to every route
/// except `/health`, which liveness probes must be able to reach without
/// credentials (see `ServerConfig` docs for the token set this checks).
pub async fn require_bearer_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX));

    match token {
        Some(token) if state.tokens.contains(token) => Ok(next.run(req).await),
        _ => Err(ApiError(DocError::Unauthorized)),
    }
}
