use async_trait::async_trait;

use crate::domain::{
    models::{InvestorId, ProjectCreated},
    ProjectError,
};

#[async_trait]
pub trait ProjectService: Send + Sync + 'static {
    /// Creates a project from a call transcript and kicks off an expert search for it.
    async fn create_from_transcript(
        &self,
        transcript: &str,
        investor_id: InvestorId,
    ) -> Result<ProjectCreated, ProjectError>;
}
