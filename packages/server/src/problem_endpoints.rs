//! Problem Endpoints
//!
//! - `GET /api/problems?slug=` - fetch a problem with its tags
//! - `POST /api/problems` - create (201) or update (200) a problem by slug
//!
//! Both answer with the problem record plus a `tags` array.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{AppState, HttpError};
use problem_admin_core::{ProblemPayload, ProblemView};

#[derive(Debug, Deserialize)]
pub struct ProblemQuery {
    slug: Option<String>,
}

/// Fetch a problem by slug
///
/// # Example
///
/// ```bash
/// curl "http://localhost:3001/api/problems?slug=two-sum"
/// ```
async fn get_problem(
    State(state): State<AppState>,
    query: Result<Query<ProblemQuery>, QueryRejection>,
) -> Result<Json<ProblemView>, HttpError> {
    let Query(query) = query?;
    let slug = query
        .slug
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| HttpError::validation("Missing required query parameter: slug"))?;

    let view = state
        .problems
        .get_problem(&slug)
        .await
        .map_err(|e| HttpError::from_service(e, "Failed to fetch problem"))?;

    Ok(Json(view))
}

/// Create or update a problem
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3001/api/problems \
///   -H "Content-Type: application/json" \
///   -d '{"slug": "two-sum", "title": "Two Sum", "tagIds": []}'
/// ```
async fn save_problem(
    State(state): State<AppState>,
    payload: Result<Json<ProblemPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ProblemView>), HttpError> {
    let Json(payload) = payload?;

    let outcome = state
        .problems
        .save_problem(payload)
        .await
        .map_err(|e| HttpError::from_service(e, "Failed to save problem"))?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.view)))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/problems", get(get_problem).post(save_problem))
        .with_state(state)
}
