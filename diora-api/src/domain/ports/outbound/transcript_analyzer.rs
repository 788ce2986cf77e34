use async_trait::async_trait;

use crate::domain::models::ProjectAnalysis;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Request(String),
    #[error("invalid analysis: {0}")]
    Invalid(String),
}

/// Turns a call transcript into a structured project brief.
#[async_trait]
pub trait TranscriptAnalyzer: Send + Sync + 'static {
    async fn analyze(&self, transcript: &str) -> Result<ProjectAnalysis, AnalysisError>;
}
