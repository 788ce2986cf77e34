use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::{
    domain::{
        models::{CallId, ExternalJobId, JobStatus, ProjectId, SearchJob, SearchStatus},
        ports::outbound::{SearchGateway, StatusReport, UpstreamStatus},
        ExpertSearchError,
    },
    repositories::ExpertRepository,
};

use super::project_experts;

/// Result of a single poll.
#[derive(Debug)]
pub enum TickOutcome {
    /// The provider is still working; poll again on the next tick.
    Continue,
    Completed { persisted: usize },
    /// The job ended without results, either upstream or by running out of attempts.
    Failed(ExpertSearchError),
    /// The job is no longer owned by this poller (replaced, removed or already finished).
    Detached,
}

impl TickOutcome {
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Drives one submitted search from `Submitted` to a terminal state, one poll per tick.
///
/// The poller only ever acts on the job it was created for: every step re-checks that
/// the store still tracks `external_job_id` under `call_id`, so a resubmission for the
/// same call id silently detaches it.
pub struct SearchPoller {
    call_id: CallId,
    external_job_id: ExternalJobId,
    project_id: Option<ProjectId>,
    gateway: Arc<dyn SearchGateway>,
    repository: Arc<dyn ExpertRepository>,
    store: super::JobStore,
    max_attempts: u32,
    finished: bool,
}

impl SearchPoller {
    pub fn new(
        job: &SearchJob,
        gateway: Arc<dyn SearchGateway>,
        repository: Arc<dyn ExpertRepository>,
        store: super::JobStore,
        max_attempts: u32,
    ) -> Self {
        Self {
            call_id: job.call_id.clone(),
            external_job_id: job.external_job_id.clone(),
            project_id: job.project_id,
            gateway,
            repository,
            store,
            max_attempts: max_attempts.max(1),
            finished: false,
        }
    }

    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }

    #[instrument(
        name = "SearchPoller::tick",
        skip(self),
        fields(call_id = %self.call_id, job_id = %self.external_job_id)
    )]
    pub async fn tick(&mut self) -> TickOutcome {
        if self.finished {
            return TickOutcome::Detached;
        }

        let Some(job) = self.begin_attempt().await else {
            tracing::debug!("Job no longer tracked, detaching poller");
            self.finished = true;
            return TickOutcome::Detached;
        };
        let attempt = job.poll_attempt;
        self.record_attempt(attempt).await;

        let report = self.gateway.get_status(&self.external_job_id).await;

        if !self.still_owned().await {
            tracing::debug!("Job replaced while polling, dropping status response");
            self.finished = true;
            return TickOutcome::Detached;
        }

        match report {
            Ok(StatusReport {
                status: UpstreamStatus::Succeeded,
                payload,
            }) => self.complete(&job, payload).await,
            Ok(StatusReport {
                status: UpstreamStatus::Failed,
                payload,
            }) => {
                tracing::error!(
                    outcome = "upstream_failed",
                    attempt,
                    payload = %payload,
                    "Search failed upstream"
                );
                self.fail(ExpertSearchError::UpstreamJobFailed).await
            }
            Ok(StatusReport {
                status: UpstreamStatus::Pending(status),
                ..
            }) => {
                tracing::debug!(attempt, status = %status, "Search still running");
                self.check_budget(attempt).await
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "Status check failed, retrying next tick");
                self.check_budget(attempt).await
            }
        }
    }

    /// Bumps the attempt counter and moves the job to `Polling`, if it is still ours.
    async fn begin_attempt(&self) -> Option<SearchJob> {
        let external_job_id = self.external_job_id.clone();
        let job = self
            .store
            .update(&self.call_id, |job| {
                if job.external_job_id == external_job_id && !job.status.is_terminal() {
                    job.status = JobStatus::Polling;
                    job.poll_attempt += 1;
                }
            })
            .await?;

        (job.external_job_id == self.external_job_id && job.status == JobStatus::Polling)
            .then_some(job)
    }

    async fn still_owned(&self) -> bool {
        self.store
            .get(&self.call_id)
            .await
            .is_some_and(|job| job.external_job_id == self.external_job_id && !job.status.is_terminal())
    }

    async fn is_current(&self) -> bool {
        self.store
            .get(&self.call_id)
            .await
            .is_some_and(|job| job.external_job_id == self.external_job_id)
    }

    async fn record_attempt(&self, attempt: u32) {
        let Some(project_id) = self.project_id else {
            return;
        };

        if attempt == 1 {
            self.set_project_status(project_id, SearchStatus::Polling)
                .await;
        }

        let count = i32::try_from(attempt).unwrap_or(i32::MAX);
        if let Err(e) = self
            .repository
            .update_polling_count(&project_id, count)
            .await
        {
            tracing::warn!("Failed to record polling count for project {}: {}", project_id, e);
        }
    }

    async fn check_budget(&mut self, attempt: u32) -> TickOutcome {
        if attempt < self.max_attempts {
            return TickOutcome::Continue;
        }

        tracing::error!(
            outcome = "budget_exhausted",
            attempts = attempt,
            "Search did not finish within the polling budget"
        );
        self.fail(ExpertSearchError::PollBudgetExhausted(self.max_attempts))
            .await
    }

    /// Claims the completion in the store before touching the database. A poller that
    /// lost its job writes nothing.
    async fn complete(&mut self, job: &SearchJob, payload: Value) -> TickOutcome {
        self.finished = true;

        if self
            .store
            .complete(&self.call_id, &self.external_job_id, payload.clone())
            .await
            .is_none()
        {
            tracing::debug!("Job replaced before completion could be recorded");
            return TickOutcome::Detached;
        }

        let Some(project_id) = self.project_id else {
            tracing::info!("Search completed without a project, keeping results in memory");
            return TickOutcome::Completed { persisted: 0 };
        };

        let persisted = self.persist(project_id, &job.query, &payload).await;

        // A resubmission during the insert owns the project status from here on.
        if self.is_current().await {
            self.set_project_status(project_id, SearchStatus::Completed)
                .await;
        }

        tracing::info!(persisted, "Search completed");
        TickOutcome::Completed { persisted }
    }

    /// Projects and stores the results. Failures are logged and the search still counts
    /// as completed.
    async fn persist(&self, project_id: ProjectId, query: &str, payload: &Value) -> usize {
        let experts = project_experts(payload, project_id, query);
        if experts.is_empty() {
            tracing::info!("Search returned no experts");
            return 0;
        }

        match self.repository.insert_experts(&experts).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(
                    "Failed to save {} experts for project {}: {}",
                    experts.len(),
                    project_id,
                    e
                );
                0
            }
        }
    }

    async fn fail(&mut self, reason: ExpertSearchError) -> TickOutcome {
        self.finished = true;

        let owned = match reason {
            // Aborted jobs stay readable as an error; failed ones are dropped.
            ExpertSearchError::PollBudgetExhausted(_) => self
                .store
                .abort(&self.call_id, &self.external_job_id)
                .await
                .is_some(),
            _ => self
                .store
                .discard(&self.call_id, &self.external_job_id)
                .await
                .is_some(),
        };
        if !owned {
            return TickOutcome::Detached;
        }

        if let Some(project_id) = self.project_id {
            self.set_project_status(project_id, SearchStatus::Failed)
                .await;
        }

        TickOutcome::Failed(reason)
    }

    async fn set_project_status(&self, project_id: ProjectId, status: SearchStatus) {
        if let Err(e) = self
            .repository
            .update_search_status(&project_id, status)
            .await
        {
            tracing::warn!(
                "Failed to set search status {:?} for project {}: {}",
                status,
                project_id,
                e
            );
        }
    }
}
