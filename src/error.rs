use thiserror::Error;

use crate::openai::OpenAiError;
use crate::queue::{JobRecord, JobStatus};

#[derive(Debug, Error)]
pub enum JobError {
    /// The item is already queued. Carries the existing record so callers
    /// can present its current state.
    #[error("job {} already in queue", existing.id)]
    DuplicateJob { existing: Box<JobRecord> },

    #[error("Source reference is required")]
    EmptySource,

    #[error("Failed to fetch media metadata: {0}")]
    MetadataResolutionFailed(String),

    #[error("Failed to download audio: {0}")]
    DownloadFailed(String),

    #[error("Failed to transcribe audio: {0}")]
    TranscriptionFailed(String),

    #[error("Failed to summarize transcript: {0}")]
    SummaryFailed(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Job {id} has no transcript to summarize (status {status})")]
    NotSummarizable { id: String, status: JobStatus },

    #[error("Summarization is disabled")]
    SummarizationDisabled,
}

/// Failures reported by the media source (metadata lookup and audio download).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("media not found: {0}")]
    NotFound(String),

    #[error("media source unreachable: {0}")]
    Unreachable(String),

    #[error("unsupported source reference: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by the transcription and summarization engines.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Api(#[from] OpenAiError),

    #[error("engine process failed: {0}")]
    Process(String),

    #[error("engine returned an empty response")]
    EmptyResponse,

    #[error("input must not be empty")]
    EmptyInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
