use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::models::{CallId, JobStatus, ProjectId, SearchJob},
};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(latest_result))
        .route("/:call_id", get(result_for_call))
}

/// The most recent completed payload, with `query` and `call_id` on top.
#[instrument(name = "GET /results", skip(app_state))]
async fn latest_result(State(app_state): State<AppState>) -> Json<Value> {
    let view = app_state
        .expert_search()
        .latest_result()
        .await
        .and_then(|job| job.result_view());

    Json(view.unwrap_or_else(|| {
        json!({
            "message": "No results available yet. Please initiate a search first.",
            "results": null
        })
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultResponse {
    call_id: CallId,
    search_id: String,
    query: String,
    status: JobStatus,
    poll_attempt: u32,
    project_id: Option<ProjectId>,
    #[serde(with = "time::serde::rfc3339")]
    submitted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl From<SearchJob> for SearchResultResponse {
    fn from(job: SearchJob) -> Self {
        let error = (job.status == JobStatus::Aborted)
            .then_some("Search did not finish within the polling budget");

        Self {
            call_id: job.call_id,
            search_id: job.external_job_id.to_string(),
            query: job.query,
            status: job.status,
            poll_attempt: job.poll_attempt,
            project_id: job.project_id,
            submitted_at: job.submitted_at,
            updated_at: job.updated_at,
            result: job.result,
            error,
        }
    }
}

#[instrument(name = "GET /results/:call_id", skip(app_state))]
async fn result_for_call(
    State(app_state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<SearchResultResponse>, ApiError> {
    let job = app_state
        .expert_search()
        .search_result(&CallId::new(call_id.as_str()))
        .await
        .ok_or_else(|| ApiError::not_found(format!("No search tracked for call id {}", call_id)))?;

    Ok(Json(job.into()))
}
