use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    domain::models::{Expert, InvestorId, ProjectCreated, ProjectId, ProjectSearchState},
};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/from-transcript", post(create_from_transcript))
        .route("/:project_id/search-status", get(search_status))
        .route("/:project_id/experts", get(experts))
}

#[derive(Debug, Deserialize)]
struct TranscriptRequest {
    transcript: String,
    investor_id: Uuid,
}

#[instrument(
    name = "POST /projects/from-transcript",
    skip_all,
    fields(investor_id = %body.investor_id)
)]
async fn create_from_transcript(
    State(app_state): State<AppState>,
    Json(body): Json<TranscriptRequest>,
) -> Result<(StatusCode, Json<ProjectCreated>), ApiError> {
    let created = app_state
        .projects()
        .create_from_transcript(&body.transcript, InvestorId::new(body.investor_id))
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(name = "GET /projects/:project_id/search-status", skip(app_state))]
async fn search_status(
    State(app_state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectSearchState>, ApiError> {
    let state = app_state
        .expert_search()
        .search_state(&ProjectId::new(project_id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Project {} not found", project_id)))?;

    Ok(Json(state))
}

#[instrument(name = "GET /projects/:project_id/experts", skip(app_state))]
async fn experts(
    State(app_state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Expert>>, ApiError> {
    let experts = app_state
        .expert_search()
        .project_experts(&ProjectId::new(project_id))
        .await?;

    Ok(Json(experts))
}
