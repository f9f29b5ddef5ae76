//! Tag Endpoints
//!
//! - `GET /api/tags` - all tags, newest first
//! - `POST /api/tags` - create a tag
//! - `PUT /api/tags/:id` - rename a tag
//! - `DELETE /api/tags/:id` - delete a tag

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Serialize;

use crate::{AppState, HttpError};
use problem_admin_core::{Tag, TagPayload};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, HttpError> {
    let tags = state
        .tags
        .list_tags()
        .await
        .map_err(|e| HttpError::from_service(e, "Failed to fetch tags"))?;
    Ok(Json(tags))
}

/// Create a tag
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3001/api/tags \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Graphs"}'
/// ```
async fn create_tag(
    State(state): State<AppState>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Tag>), HttpError> {
    let Json(payload) = payload?;

    let tag = state
        .tags
        .create_tag(payload.name.as_deref())
        .await
        .map_err(|e| HttpError::from_service(e, "Failed to create tag"))?;

    Ok((StatusCode::CREATED, Json(tag)))
}

async fn rename_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> Result<Json<Tag>, HttpError> {
    let Json(payload) = payload?;

    let tag = state
        .tags
        .rename_tag(&id, payload.name.as_deref())
        .await
        .map_err(|e| HttpError::from_service(e, "Failed to update tag"))?;

    Ok(Json(tag))
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, HttpError> {
    state
        .tags
        .delete_tag(&id)
        .await
        .map_err(|e| HttpError::from_service(e, "Failed to delete tag"))?;

    Ok(Json(DeleteResponse {
        message: "Tag deleted successfully".to_string(),
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/:id", put(rename_tag).delete(delete_tag))
        .with_state(state)
}
