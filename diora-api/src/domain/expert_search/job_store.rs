use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::domain::models::{CallId, ExternalJobId, JobStatus, SearchJob};

/// In-memory registry of search jobs keyed by call id.
///
/// Cheap to clone; clones share the same registry. Each call id is owned by exactly
/// one poller at a time, so writes are last-writer-wins per key and no lock is ever
/// held across I/O.
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<CallId, SearchJob>>>,
    /// Snapshot of the newest completion. Kept until a newer job completes, even if its
    /// call id is resubmitted in the meantime.
    latest_completed: Arc<RwLock<Option<SearchJob>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a job, replacing any previous job for the same call id.
    pub async fn insert(&self, job: SearchJob) -> Option<SearchJob> {
        self.jobs.write().await.insert(job.call_id.clone(), job)
    }

    pub async fn get(&self, call_id: &CallId) -> Option<SearchJob> {
        self.jobs.read().await.get(call_id).cloned()
    }

    /// Applies `f` to the job and returns the updated snapshot, or `None` if the call id
    /// is not tracked.
    pub async fn update(
        &self,
        call_id: &CallId,
        f: impl FnOnce(&mut SearchJob),
    ) -> Option<SearchJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(call_id)?;
        f(job);
        job.updated_at = OffsetDateTime::now_utc();
        Some(job.clone())
    }

    /// Marks the job completed with the provider payload and makes it the latest result.
    ///
    /// Succeeds at most once per job, and only while `external_job_id` is still the
    /// running job tracked under `call_id`.
    pub async fn complete(
        &self,
        call_id: &CallId,
        external_job_id: &ExternalJobId,
        payload: Value,
    ) -> Option<SearchJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(call_id).filter(|job| {
            &job.external_job_id == external_job_id && !job.status.is_terminal()
        })?;
        job.status = JobStatus::Completed;
        job.result = Some(payload);
        job.updated_at = OffsetDateTime::now_utc();
        let job = job.clone();

        self.latest_completed.write().await.replace(job.clone());

        Some(job)
    }

    /// Marks the job aborted. It stays tracked so its call id reads back as an error.
    pub async fn abort(
        &self,
        call_id: &CallId,
        external_job_id: &ExternalJobId,
    ) -> Option<SearchJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(call_id).filter(|job| {
            &job.external_job_id == external_job_id && !job.status.is_terminal()
        })?;
        job.status = JobStatus::Aborted;
        job.updated_at = OffsetDateTime::now_utc();
        Some(job.clone())
    }

    /// Removes the job only if it still belongs to `external_job_id`.
    pub async fn discard(
        &self,
        call_id: &CallId,
        external_job_id: &ExternalJobId,
    ) -> Option<SearchJob> {
        let mut jobs = self.jobs.write().await;
        if jobs
            .get(call_id)
            .is_some_and(|job| &job.external_job_id == external_job_id)
        {
            jobs.remove(call_id)
        } else {
            None
        }
    }

    /// The most recently completed job, if any.
    pub async fn latest_completed(&self) -> Option<SearchJob> {
        self.latest_completed.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}
