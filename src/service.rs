//! Submission and query interfaces over the [`JobStore`].
//!
//! [`JobService`] is the thin producer/consumer the HTTP layer talks to:
//! it resolves metadata before enqueuing, serves snapshots to readers and
//! re-runs summarization for finished jobs on request.

use std::sync::Arc;

use crate::error::JobError;
use crate::fetch::MetadataResolver;
use crate::queue::{JobRecord, JobStatus, JobStore, JobUpdate};
use crate::summarize::Summarizer;

#[derive(Clone)]
pub struct JobService {
    store: JobStore,
    resolver: Arc<dyn MetadataResolver>,
    summarizer: Arc<dyn Summarizer>,
}

impl JobService {
    pub fn new(
        store: JobStore,
        resolver: Arc<dyn MetadataResolver>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            store,
            resolver,
            summarizer,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Resolve metadata for `source_ref` and enqueue it.
    ///
    /// Blocks on the media source. Nothing is stored when resolution fails;
    /// a reference that resolves to an already queued id yields
    /// [`JobError::DuplicateJob`] with the existing record.
    pub async fn submit(&self, source_ref: &str) -> Result<JobRecord, JobError> {
        let source_ref = source_ref.trim();
        if source_ref.is_empty() {
            return Err(JobError::EmptySource);
        }

        let metadata = self
            .resolver
            .resolve(source_ref)
            .await
            .map_err(|e| JobError::MetadataResolutionFailed(e.to_string()))?;

        let job = self.store.add(metadata.into_new_job(source_ref))?;
        tracing::info!(job_id = %job.id, title = %job.title, "job added to queue");
        Ok(job)
    }

    pub fn list_jobs(&self) -> Vec<JobRecord> {
        self.store.list()
    }

    pub fn get_job(&self, id: &str) -> Result<JobRecord, JobError> {
        self.store
            .get(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Produce a fresh summary for a job that already has a transcript.
    pub async fn resummarize(&self, id: &str) -> Result<JobRecord, JobError> {
        let job = self.get_job(id)?;
        let eligible = matches!(job.status, JobStatus::Completed | JobStatus::SummaryFailed);
        if !eligible || job.transcript.is_empty() {
            return Err(JobError::NotSummarizable {
                id: job.id,
                status: job.status,
            });
        }
        if !self.summarizer.is_enabled() {
            return Err(JobError::SummarizationDisabled);
        }

        let summary = self
            .summarizer
            .summarize(&job.title, &job.transcript)
            .await
            .map_err(|e| JobError::SummaryFailed(e.to_string()))?;

        self.store
            .update(id, JobUpdate::status(JobStatus::Completed).with_summary(summary))?;
        tracing::info!(job_id = %id, "job resummarized");
        self.get_job(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::{EngineError, FetchError};
    use crate::fetch::MediaMetadata;
    use crate::summarize::NoOpSummarizer;

    struct MockResolver {
        calls: AtomicUsize,
    }

    impl MockResolver {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MetadataResolver for MockResolver {
        async fn resolve(&self, source_ref: &str) -> Result<MediaMetadata, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match source_ref {
                "X" | "https://youtu.be/abc" => Ok(MediaMetadata {
                    id: "abc".into(),
                    title: "T".into(),
                    duration: "3:21".into(),
                    published_at: None,
                }),
                "offline" => Err(FetchError::Unreachable("network is down".into())),
                other => Err(FetchError::Unsupported(other.to_string())),
            }
        }
    }

    struct FixedSummarizer(Result<&'static str, &'static str>);

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn summarize(&self, _title: &str, _text: &str) -> Result<String, EngineError> {
            self.0
                .map(str::to_string)
                .map_err(|e| EngineError::Process(e.to_string()))
        }
    }

    fn service(summarizer: Arc<dyn Summarizer>) -> (JobService, Arc<MockResolver>) {
        let resolver = MockResolver::new();
        let service = JobService::new(JobStore::new(), resolver.clone(), summarizer);
        (service, resolver)
    }

    fn finish(service: &JobService, id: &str, transcript: &str, status: JobStatus) {
        let store = service.store();
        store.next().unwrap();
        store.update(id, JobUpdate::status(JobStatus::Downloading)).unwrap();
        store.update(id, JobUpdate::status(JobStatus::Transcribing)).unwrap();
        store
            .update(id, JobUpdate::status(JobStatus::Summarizing).with_transcript(transcript))
            .unwrap();
        store.update(id, JobUpdate::status(status)).unwrap();
    }

    #[tokio::test]
    async fn submit_enqueues_pending_record() {
        let (service, _) = service(Arc::new(NoOpSummarizer));
        let job = service.submit("  X  ").await.unwrap();
        assert_eq!(job.id, "abc");
        assert_eq!(job.title, "T");
        assert_eq!(job.source_ref, "X");
        assert_eq!(job.status, JobStatus::Pending);

        let jobs = service.list_jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn duplicate_is_keyed_on_resolved_id() {
        let (service, _) = service(Arc::new(NoOpSummarizer));
        service.submit("X").await.unwrap();

        let err = service.submit("https://youtu.be/abc").await.unwrap_err();
        match err {
            JobError::DuplicateJob { existing } => assert_eq!(existing.source_ref, "X"),
            other => panic!("expected DuplicateJob, got {other:?}"),
        }
        assert_eq!(service.list_jobs().len(), 1);
    }

    #[tokio::test]
    async fn resolution_failure_never_enters_store() {
        let (service, _) = service(Arc::new(NoOpSummarizer));
        let err = service.submit("offline").await.unwrap_err();
        assert!(matches!(err, JobError::MetadataResolutionFailed(ref d) if d.contains("network is down")));
        let err = service.submit("not-a-url").await.unwrap_err();
        assert!(matches!(err, JobError::MetadataResolutionFailed(_)));
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn empty_source_skips_resolver() {
        let (service, resolver) = service(Arc::new(NoOpSummarizer));
        assert!(matches!(service.submit("   ").await, Err(JobError::EmptySource)));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_job_unknown_is_not_found() {
        let (service, _) = service(Arc::new(NoOpSummarizer));
        assert!(matches!(service.get_job("nope"), Err(JobError::NotFound(_))));
        service.submit("X").await.unwrap();
        assert_eq!(service.get_job("abc").unwrap().title, "T");
    }

    #[tokio::test]
    async fn resummarize_overwrites_summary() {
        let (service, _) = service(Arc::new(FixedSummarizer(Ok("fresh"))));
        service.submit("X").await.unwrap();
        finish(&service, "abc", "hello world", JobStatus::SummaryFailed);

        let job = service.resummarize("abc").await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.summary, "fresh");
        assert_eq!(job.transcript, "hello world");
        assert!(job.last_error.is_empty());
    }

    #[tokio::test]
    async fn resummarize_requires_transcript() {
        let (service, _) = service(Arc::new(FixedSummarizer(Ok("fresh"))));
        service.submit("X").await.unwrap();
        let err = service.resummarize("abc").await.unwrap_err();
        assert!(matches!(
            err,
            JobError::NotSummarizable {
                status: JobStatus::Pending,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn resummarize_engine_failure_leaves_record() {
        let (service, _) = service(Arc::new(FixedSummarizer(Err("quota exceeded"))));
        service.submit("X").await.unwrap();
        finish(&service, "abc", "hello world", JobStatus::Completed);

        let err = service.resummarize("abc").await.unwrap_err();
        assert!(matches!(err, JobError::SummaryFailed(ref d) if d.contains("quota exceeded")));
        let job = service.get_job("abc").unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.summary.is_empty());
    }

    #[tokio::test]
    async fn resummarize_disabled() {
        let (service, _) = service(Arc::new(NoOpSummarizer));
        service.submit("X").await.unwrap();
        finish(&service, "abc", "hello world", JobStatus::Completed);
        assert!(matches!(
            service.resummarize("abc").await,
            Err(JobError::SummarizationDisabled)
        ));
        assert!(service.get_job("abc").unwrap().summary.is_empty());
    }
}
