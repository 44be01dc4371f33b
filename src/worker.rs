use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::sleep;
use tracing::Instrument;

use crate::error::JobError;
use crate::fetch::MediaFetcher;
use crate::queue::{JobRecord, JobStatus, JobStore, JobUpdate};
use crate::summarize::Summarizer;
use crate::transcribe::Transcriber;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Drives queued jobs through download → transcription → [summarization],
/// one job at a time.
///
/// Exactly one worker is expected per process. Collaborator calls happen
/// outside the store lock; every stage boundary is written back to the
/// store so readers see progress as it happens.
pub struct Worker {
    store: JobStore,
    fetcher: Arc<dyn MediaFetcher>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
    poll_interval: Duration,
    scratch_root: Option<PathBuf>,
}

impl Worker {
    pub fn new(
        store: JobStore,
        fetcher: Arc<dyn MediaFetcher>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            store,
            fetcher,
            transcriber,
            summarizer,
            poll_interval: DEFAULT_POLL_INTERVAL,
            scratch_root: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Create per-job scratch directories under `root` instead of the
    /// system temp directory.
    pub fn with_scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    /// Runs for the lifetime of the process. When the queue is empty the
    /// worker sleeps for the poll interval, waking early if a job is added.
    pub async fn run(self) {
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            summarization = self.summarizer.is_enabled(),
            "transcription worker started"
        );

        loop {
            if self.run_once().await {
                continue;
            }
            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                _ = self.store.job_added() => {}
            }
        }
    }

    /// Claims and fully processes at most one job. Returns whether a job
    /// was claimed.
    pub async fn run_once(&self) -> bool {
        let Some(job) = self.store.next() else {
            return false;
        };

        let span = tracing::info_span!("job", job_id = %job.id);
        self.process(job).instrument(span).await;
        true
    }

    async fn process(&self, job: JobRecord) {
        tracing::info!(title = %job.title, source = %job.source_ref, "processing job");

        // Removed when dropped, whichever way this function returns.
        let scratch = match self.scratch_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!(error = %e, "failed to create scratch directory");
                self.record(
                    &job.id,
                    JobUpdate::failed(
                        JobStatus::Failed,
                        format!("Failed to create temp directory: {e}"),
                    ),
                );
                return;
            }
        };

        // DOWNLOAD
        self.record(&job.id, JobUpdate::status(JobStatus::Downloading));
        let media = match self.fetcher.fetch(&job.source_ref, scratch.path()).await {
            Ok(media) => media,
            Err(e) => {
                self.fail(&job, JobStatus::DownloadFailed, JobError::DownloadFailed(e.to_string()));
                return;
            }
        };
        let media_path = media.local_path.display().to_string();
        self.store.set_media_path(&job.id, &media_path);
        tracing::info!(path = %media_path, "audio downloaded");

        // TRANSCRIBE
        self.record(&job.id, JobUpdate::status(JobStatus::Transcribing));
        let transcript = match self.transcriber.transcribe(&media.local_path).await {
            Ok(text) => text,
            Err(e) => {
                self.fail(
                    &job,
                    JobStatus::TranscriptionFailed,
                    JobError::TranscriptionFailed(e.to_string()),
                );
                return;
            }
        };

        if !self.summarizer.is_enabled() {
            self.record(
                &job.id,
                JobUpdate::status(JobStatus::Completed).with_transcript(transcript),
            );
            tracing::info!("job completed");
            return;
        }

        // SUMMARIZE
        self.record(
            &job.id,
            JobUpdate::status(JobStatus::Summarizing).with_transcript(transcript.clone()),
        );
        match self.summarizer.summarize(&job.title, &transcript).await {
            Ok(summary) => {
                self.record(
                    &job.id,
                    JobUpdate::status(JobStatus::Completed).with_summary(summary),
                );
                tracing::info!("job completed with summary");
            }
            Err(e) => {
                self.fail(&job, JobStatus::SummaryFailed, JobError::SummaryFailed(e.to_string()));
            }
        }
    }

    fn fail(&self, job: &JobRecord, status: JobStatus, error: JobError) {
        tracing::warn!(%status, error = %error, "job failed");
        self.record(&job.id, JobUpdate::failed(status, error.to_string()));
    }

    fn record(&self, id: &str, update: JobUpdate) {
        if let Err(e) = self.store.update(id, update) {
            tracing::error!(error = %e, "failed to record job status");
        }
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ytscribe-worker-");
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }
}
