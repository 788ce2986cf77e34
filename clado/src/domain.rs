use serde::Serialize;
use serde_json::Value;

use crate::CladoError;

/// Body of a deep-research submission.
#[derive(Debug, Serialize)]
pub struct DeepResearchRequest<'a> {
    pub query: &'a str,
    pub limit: u32,
}

/// A freshly submitted deep-research job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepResearchJob {
    pub job_id: String,
}

impl DeepResearchJob {
    /// Extracts the job id from a submission response. Clado has returned both string and
    /// numeric ids, so both are accepted.
    pub fn from_response(body: &Value) -> Result<Self, CladoError> {
        let job_id = match body.get("job_id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(CladoError::MissingJobId),
        };

        Ok(Self { job_id })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Completed,
    Failed,
    /// Any non-terminal state, e.g. `processing` or `pending`.
    Running(String),
}

impl JobState {
    pub fn from_status(status: &str) -> Self {
        match status {
            "completed" | "success" => Self::Completed,
            "failed" | "error" => Self::Failed,
            other => Self::Running(other.to_string()),
        }
    }
}

/// Status of a deep-research job together with the full response body.
///
/// The body is kept untouched since completed jobs carry the `results` array in it.
#[derive(Debug, Clone)]
pub struct DeepResearchStatus {
    pub state: JobState,
    pub body: Value,
}

impl DeepResearchStatus {
    pub fn from_response(body: Value) -> Self {
        let state = JobState::from_status(body.get("status").and_then(Value::as_str).unwrap_or(""));

        Self { state, body }
    }
}
