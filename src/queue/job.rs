use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a queued job.
///
/// Each job flows through: PENDING → PROCESSING → DOWNLOADING → TRANSCRIBING
/// → [SUMMARIZING] → COMPLETED, and any in-progress state may drop into a
/// terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Downloading,
    Transcribing,
    Summarizing,
    Completed,
    DownloadFailed,
    TranscriptionFailed,
    SummaryFailed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Downloading => "downloading",
            JobStatus::Transcribing => "transcribing",
            JobStatus::Summarizing => "summarizing",
            JobStatus::Completed => "completed",
            JobStatus::DownloadFailed => "download_failed",
            JobStatus::TranscriptionFailed => "transcription_failed",
            JobStatus::SummaryFailed => "summary_failed",
            JobStatus::Failed => "failed",
        }
    }

    /// No further automatic transition happens from a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed) || self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            JobStatus::DownloadFailed
                | JobStatus::TranscriptionFailed
                | JobStatus::SummaryFailed
                | JobStatus::Failed
        )
    }

    /// Whether the pipeline may move a job from `self` to `next`.
    ///
    /// Staying in the same status is always allowed so that field-only
    /// updates (e.g. a fresh summary) go through the same path.
    /// `SummaryFailed → Completed` is the one way out of a failure and is
    /// only taken by a manual resummarization.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;

        if *self == next {
            return true;
        }
        match self {
            Pending => matches!(next, Processing),
            Processing => matches!(next, Downloading | Failed),
            Downloading => matches!(next, Transcribing | DownloadFailed | Failed),
            Transcribing => matches!(
                next,
                Summarizing | Completed | TranscriptionFailed | Failed
            ),
            Summarizing => matches!(next, Completed | SummaryFailed | Failed),
            SummaryFailed => matches!(next, Completed),
            Completed | DownloadFailed | TranscriptionFailed | Failed => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate accepted by [`JobStore::add`](super::JobStore::add), built from
/// resolved source metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub id: String,
    pub source_ref: String,
    pub title: String,
    pub duration: String,
    pub published_at: Option<NaiveDate>,
}

/// One submitted media reference and its tracked processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub source_ref: String,
    pub title: String,
    pub duration: String,
    pub published_at: Option<NaiveDate>,
    pub status: JobStatus,
    pub media_path: String,
    pub transcript: String,
    pub summary: String,
    pub last_error: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(candidate: NewJob) -> Self {
        let now = Utc::now();
        Self {
            id: candidate.id,
            source_ref: candidate.source_ref,
            title: candidate.title,
            duration: candidate.duration,
            published_at: candidate.published_at,
            status: JobStatus::Pending,
            media_path: String::new(),
            transcript: String::new(),
            summary: String::new(),
            last_error: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl PartialEq for JobRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for JobRecord {}

/// A status write recorded by the worker (or a resummarization).
///
/// `error` always overwrites `last_error` (empty clears it). `transcript`
/// and `summary` are only written when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub error: String,
    pub transcript: Option<String>,
    pub summary: Option<String>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status,
            error: String::new(),
            transcript: None,
            summary: None,
        }
    }

    pub fn failed(status: JobStatus, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::status(status)
        }
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Parses the `YYYYMMDD` upload date reported by the media source.
pub fn parse_upload_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}
