use std::sync::Arc;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use docstore::error::Error as DocError;
use crate::auth::require_bearer_token;
use crate::error::ApiError;
use crate::json_extractor::ValidJson;
use crate::orchestration;
use crate::receiver;
use crate::replication::ChangeRecord;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: usize = 1000;
const MAX_LIST_LIMIT: usize = 1000;

pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/docs", get(list_docs).post(create_doc))
        .route("/api/docs/:id", get(get_doc).delete(delete_doc))
        .route("/replicate", post(replicate))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_bearer_token));

    Router::new().route("/health", get(health)).merge(protected).with_state(state)
}

async fn health() -> impl IntoResponse {
    log::debug!("health check");
    Json(json!({"status": "ok"}))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_docs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = match query.limit {
        Some(limit) if limit == 0 || limit > MAX_LIST_LIMIT => {
            return Err(ApiError(DocError::InvalidPayload(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}"
            ))));
        }
        Some(limit) => limit,
        None => DEFAULT_LIST_LIMIT,
    };
    let ids = state.store.list_ids(limit).await?;
    Ok(Json(json!({"ids": ids})))
}

async fn create_doc(
    State(state): State<Arc<AppState>>,
    ValidJson(input): ValidJson<Value>,
) -> Result<Response, ApiError> {
    let saved = orchestration::create_or_update(&state, input).await?;
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

async fn get_doc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.store.get(&id).await? {
        Some(doc) => Ok(Json(doc)),
        None => Err(ApiError(DocError::NotFound)),
    }
}

async fn delete_doc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    orchestration::delete(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn replicate(
    State(state): State<Arc<AppState>>,
    ValidJson(change): ValidJson<ChangeRecord>,
) -> Result<Response, ApiError> {
    receiver::apply(&state.store, change).await?;
    Ok((StatusCode::OK, Json(json!({"ok": true}))).into_response())
}
