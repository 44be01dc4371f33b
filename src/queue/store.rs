use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::job::{JobRecord, JobStatus, JobUpdate, NewJob};
use crate::error::JobError;

/// Ordered, lock-protected collection of every job submitted to the process.
///
/// Cloning the store yields another handle to the same collection. All
/// operations take the single lock only for in-memory work and hand out
/// independent copies of the records.
#[derive(Clone, Default)]
pub struct JobStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    // Arrival order.
    jobs: Mutex<Vec<JobRecord>>,
    added: Notify,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pending record for `candidate`.
    ///
    /// A second add with the same id fails with [`JobError::DuplicateJob`]
    /// carrying a copy of the existing record; the store is left untouched.
    pub fn add(&self, candidate: NewJob) -> Result<JobRecord, JobError> {
        let record = self.insert(candidate)?;
        self.inner.added.notify_one();
        Ok(record)
    }

    /// [`add`](Self::add) without waking the worker; it will find the job
    /// on its next poll.
    pub(crate) fn insert(&self, candidate: NewJob) -> Result<JobRecord, JobError> {
        let mut jobs = self.inner.jobs.lock();
        if let Some(existing) = jobs.iter().find(|job| job.id == candidate.id) {
            return Err(JobError::DuplicateJob {
                existing: Box::new(existing.clone()),
            });
        }
        let record = JobRecord::new(candidate);
        jobs.push(record.clone());
        Ok(record)
    }

    /// Claims the first pending job in arrival order, moving it to `processing`.
    pub fn next(&self) -> Option<JobRecord> {
        let mut jobs = self.inner.jobs.lock();
        let job = jobs
            .iter_mut()
            .find(|job| job.status == JobStatus::Pending)?;
        job.status = JobStatus::Processing;
        job.updated_at = Utc::now();
        Some(job.clone())
    }

    /// Records a status write. Unknown ids are ignored.
    pub fn update(&self, id: &str, update: JobUpdate) -> Result<(), JobError> {
        let mut jobs = self.inner.jobs.lock();
        let Some(job) = jobs.iter_mut().find(|job| job.id == id) else {
            return Ok(());
        };

        if !job.status.can_transition_to(update.status) {
            return Err(JobError::InvalidTransition {
                id: id.to_string(),
                from: job.status,
                to: update.status,
            });
        }

        job.status = update.status;
        job.last_error = update.error;
        if let Some(transcript) = update.transcript {
            job.transcript = transcript;
        }
        if let Some(summary) = update.summary {
            job.summary = summary;
        }
        job.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_media_path(&self, id: &str, path: &str) {
        let mut jobs = self.inner.jobs.lock();
        if let Some(job) = jobs.iter_mut().find(|job| job.id == id) {
            job.media_path = path.to_string();
            job.updated_at = Utc::now();
        }
    }

    /// Point-in-time copy of all records, most recently added first.
    pub fn list(&self) -> Vec<JobRecord> {
        self.inner.jobs.lock().iter().rev().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<JobRecord> {
        self.inner
            .jobs
            .lock()
            .iter()
            .find(|job| job.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves once a job has been added since the last wake-up.
    pub async fn job_added(&self) {
        self.inner.added.notified().await;
    }
}
