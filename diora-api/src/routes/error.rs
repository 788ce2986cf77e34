use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

use crate::{
    domain::{ExpertSearchError, ProjectError},
    repositories::RepositoryError,
};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                Self::internal("Internal server error").with_details(err.to_string())
            }
            RepositoryError::NotFound(_) => Self::not_found(err.to_string()),
        }
    }
}

impl From<ExpertSearchError> for ApiError {
    fn from(err: ExpertSearchError) -> Self {
        match err {
            ExpertSearchError::InvalidRequest(message) => Self::bad_request(message),
            ExpertSearchError::Configuration(message) => Self::internal(message),
            ExpertSearchError::UpstreamUnavailable(message)
            | ExpertSearchError::UpstreamProtocol(message) => {
                Self::internal("Failed to initiate Clado search").with_details(message)
            }
            ExpertSearchError::Persistence(e) => e.into(),
            ExpertSearchError::UpstreamJobFailed | ExpertSearchError::PollBudgetExhausted(_) => {
                Self::internal("Internal server error").with_details(err.to_string())
            }
        }
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::InvalidRequest(message) => Self::bad_request(message),
            ProjectError::SlugConflict(_) => Self::conflict(err.to_string()),
            ProjectError::Repository(e) => e.into(),
        }
    }
}
