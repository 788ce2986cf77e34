use thiserror::Error;

use crate::repositories::RepositoryError;

use super::ports::outbound::GatewayError;

/// Errors of the expert search pipeline.
///
/// Only the first four ever reach an HTTP caller; the rest happen inside the polling
/// lifecycle and are logged and reflected in the project's persisted status.
#[derive(Debug, Error)]
pub enum ExpertSearchError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Configuration(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream protocol error: {0}")]
    UpstreamProtocol(String),
    #[error("upstream job failed")]
    UpstreamJobFailed,
    #[error("poll budget of {0} attempts exhausted")]
    PollBudgetExhausted(u32),
    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl From<GatewayError> for ExpertSearchError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unavailable(message) => Self::UpstreamUnavailable(message),
            GatewayError::Protocol(message) => Self::UpstreamProtocol(message),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("A project named \"{0}\" already exists")]
    SlugConflict(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
