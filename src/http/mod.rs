//! HTTP boundary for the job queue.
//!
//! ```text
//! GET  /health                     liveness
//! GET  /queue, /api/jobs           all jobs, most recent first
//! GET  /api/jobs/{id}              one job
//! POST /api/jobs                   submit {"source_ref": "..."}
//! POST /api/jobs/{id}/summarize    re-run summarization
//! ```

mod handlers;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::JobError;
use crate::service::JobService;

pub use handlers::{SubmitOutcome, SubmitRequest, SubmitResponse};

pub fn router(service: JobService) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/queue", get(handlers::list_jobs))
        .route(
            "/api/jobs",
            get(handlers::list_jobs).post(handlers::submit_job),
        )
        .route("/api/jobs/{id}", get(handlers::get_job))
        .route("/api/jobs/{id}/summarize", post(handlers::summarize_job))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl JobError {
    fn status_code(&self) -> StatusCode {
        match self {
            JobError::EmptySource => StatusCode::BAD_REQUEST,
            JobError::NotFound(_) => StatusCode::NOT_FOUND,
            JobError::DuplicateJob { .. }
            | JobError::InvalidTransition { .. }
            | JobError::NotSummarizable { .. } => StatusCode::CONFLICT,
            JobError::MetadataResolutionFailed(_)
            | JobError::DownloadFailed(_)
            | JobError::TranscriptionFailed(_)
            | JobError::SummaryFailed(_) => StatusCode::BAD_GATEWAY,
            JobError::SummarizationDisabled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
