use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    domain::{
        expert_search::{JobStore, PollingScheduler, SearchPoller},
        models::{
            CallId, Expert, ProjectId, ProjectSearchState, SearchAccepted, SearchJob,
            SearchRequest,
        },
        ports::{inbound::ExpertSearchService, outbound::SearchGateway},
        ExpertSearchError,
    },
    repositories::ExpertRepository,
};

#[derive(Debug, Clone)]
pub struct ExpertSearchConfig {
    /// Number of candidates requested from the provider.
    pub result_limit: u32,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Prefix of generated call ids.
    pub call_id_prefix: String,
}

impl Default for ExpertSearchConfig {
    fn default() -> Self {
        Self {
            result_limit: 30,
            poll_interval: Duration::from_secs(30),
            max_poll_attempts: 20,
            call_id_prefix: "direct".to_string(),
        }
    }
}

pub struct ExpertSearchServiceImpl {
    /// `None` when no provider credential is configured.
    gateway: Option<Arc<dyn SearchGateway>>,
    repository: Arc<dyn ExpertRepository>,
    store: JobStore,
    scheduler: PollingScheduler,
    config: ExpertSearchConfig,
}

impl ExpertSearchServiceImpl {
    pub fn new(
        gateway: Option<Arc<dyn SearchGateway>>,
        repository: Arc<dyn ExpertRepository>,
        config: ExpertSearchConfig,
    ) -> Self {
        Self {
            gateway,
            repository,
            store: JobStore::new(),
            scheduler: PollingScheduler::new(config.poll_interval),
            config,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn scheduler(&self) -> &PollingScheduler {
        &self.scheduler
    }
}

#[async_trait]
impl ExpertSearchService for ExpertSearchServiceImpl {
    #[instrument(
        name = "ExpertSearchService::start_search",
        skip(self, request),
        fields(call_id)
    )]
    async fn start_search(
        &self,
        request: SearchRequest,
    ) -> Result<SearchAccepted, ExpertSearchError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ExpertSearchError::InvalidRequest(
                "search_query is required".to_string(),
            ));
        }

        let gateway = self.gateway.as_ref().ok_or_else(|| {
            ExpertSearchError::Configuration("Clado API key not configured".to_string())
        })?;

        let call_id = request
            .call_id
            .unwrap_or_else(|| CallId::generate(&self.config.call_id_prefix));
        tracing::Span::current().record("call_id", tracing::field::display(&call_id));

        let search_id = gateway
            .submit(query, self.config.result_limit)
            .await
            .inspect_err(|e| tracing::error!("Failed to submit search: {}", e))?;
        tracing::info!(job_id = %search_id, query, "Search submitted");

        let job = SearchJob::new(
            call_id.clone(),
            search_id.clone(),
            query,
            request.submitter_name,
            request.project_id,
        );

        if let Some(project_id) = job.project_id {
            if let Err(e) = self.repository.start_search(&project_id, query).await {
                tracing::warn!("Failed to mark search pending for project {}: {}", project_id, e);
            }
        }

        if let Some(previous) = self.store.insert(job.clone()).await {
            tracing::debug!(
                previous_job_id = %previous.external_job_id,
                "Replacing tracked search for call id"
            );
        }

        let poller = SearchPoller::new(
            &job,
            Arc::clone(gateway),
            Arc::clone(&self.repository),
            self.store.clone(),
            self.config.max_poll_attempts,
        );
        self.scheduler.start(poller).await;

        Ok(SearchAccepted { call_id, search_id })
    }

    async fn latest_result(&self) -> Option<SearchJob> {
        self.store.latest_completed().await
    }

    async fn search_result(&self, call_id: &CallId) -> Option<SearchJob> {
        self.store.get(call_id).await
    }

    async fn search_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectSearchState>, ExpertSearchError> {
        Ok(self.repository.search_state(project_id).await?)
    }

    async fn project_experts(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Expert>, ExpertSearchError> {
        Ok(self.repository.experts_for_project(project_id).await?)
    }
}
