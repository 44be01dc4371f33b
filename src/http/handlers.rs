use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::JobError;
use crate::queue::JobRecord;
use crate::service::JobService;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(alias = "url", alias = "youtube_url")]
    pub source_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Created,
    Duplicate,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    pub job: JobRecord,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_jobs(State(service): State<JobService>) -> Json<Vec<JobRecord>> {
    Json(service.list_jobs())
}

pub async fn get_job(
    State(service): State<JobService>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, JobError> {
    service.get_job(&id).map(Json)
}

/// Duplicates are answered with `409` and the record already in the queue.
pub async fn submit_job(
    State(service): State<JobService>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    match service.submit(&req.source_ref).await {
        Ok(job) => (
            StatusCode::CREATED,
            Json(SubmitResponse {
                outcome: SubmitOutcome::Created,
                job,
            }),
        )
            .into_response(),
        Err(JobError::DuplicateJob { existing }) => {
            tracing::info!(job_id = %existing.id, "duplicate submission");
            (
                StatusCode::CONFLICT,
                Json(SubmitResponse {
                    outcome: SubmitOutcome::Duplicate,
                    job: *existing,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn summarize_job(
    State(service): State<JobService>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, JobError> {
    service.resummarize(&id).await.map(Json)
}
