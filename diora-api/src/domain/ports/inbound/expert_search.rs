use async_trait::async_trait;

use crate::domain::{
    models::{
        CallId, Expert, ProjectId, ProjectSearchState, SearchAccepted, SearchJob, SearchRequest,
    },
    ExpertSearchError,
};

#[async_trait]
pub trait ExpertSearchService: Send + Sync + 'static {
    /// Submits the search upstream and starts polling it in the background.
    ///
    /// Returns as soon as the provider has accepted the job.
    async fn start_search(&self, request: SearchRequest)
        -> Result<SearchAccepted, ExpertSearchError>;

    /// The most recently completed search, if any.
    async fn latest_result(&self) -> Option<SearchJob>;

    async fn search_result(&self, call_id: &CallId) -> Option<SearchJob>;

    async fn search_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectSearchState>, ExpertSearchError>;

    async fn project_experts(&self, project_id: &ProjectId)
        -> Result<Vec<Expert>, ExpertSearchError>;
}
