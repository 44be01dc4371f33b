//! Media source boundary: metadata lookup at submission time and audio
//! download inside the worker.

mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FetchError;
use crate::queue::NewJob;

pub use ytdlp::YtDlp;

/// Minimal identifying metadata resolved before a job is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub published_at: Option<NaiveDate>,
}

impl MediaMetadata {
    pub fn into_new_job(self, source_ref: impl Into<String>) -> NewJob {
        NewJob {
            id: self.id,
            source_ref: source_ref.into(),
            title: self.title,
            duration: self.duration,
            published_at: self.published_at,
        }
    }
}

/// Audio downloaded for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub local_path: PathBuf,
}

#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, source_ref: &str) -> Result<MediaMetadata, FetchError>;
}

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download the audio track of `source_ref` into `dest_dir`.
    async fn fetch(&self, source_ref: &str, dest_dir: &Path) -> Result<FetchedMedia, FetchError>;
}
