//! Search provider port (outbound).
//!
//! Defines the interface for submitting deep-research jobs and checking on them, so the
//! pipeline never depends on a concrete HTTP client.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::ExternalJobId;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Transport failure or non-success HTTP status.
    #[error("{0}")]
    Unavailable(String),
    /// The provider answered, but not with what the contract promises.
    #[error("{0}")]
    Protocol(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamStatus {
    Succeeded,
    Failed,
    /// Still running, with the raw status string (`processing`, `pending`, ...).
    Pending(String),
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub status: UpstreamStatus,
    /// Full provider response; carries `results` once succeeded.
    pub payload: Value,
}

#[async_trait]
pub trait SearchGateway: Send + Sync + 'static {
    /// Submits a search, returning the provider's job id.
    async fn submit(&self, query: &str, limit: u32) -> Result<ExternalJobId, GatewayError>;

    /// Current status of a submitted job. A still-running job is a normal result.
    async fn get_status(&self, job_id: &ExternalJobId) -> Result<StatusReport, GatewayError>;
}
