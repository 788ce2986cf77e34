use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use super::{CallId, ExternalJobId, ProjectId};

/// Lifecycle of a search job.
///
/// `Submitted -> Polling -> {Completed | Aborted}`. `Aborted` means the attempt budget
/// ran out before the provider reported a terminal state; the job stays tracked so
/// callers can read the error back. Jobs the provider fails are dropped instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Polling,
    Completed,
    Aborted,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchJob {
    pub call_id: CallId,
    pub external_job_id: ExternalJobId,
    pub query: String,
    pub submitter_name: Option<String>,
    pub project_id: Option<ProjectId>,
    pub status: JobStatus,
    pub poll_attempt: u32,
    /// Raw provider payload, only present once completed.
    pub result: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl SearchJob {
    pub fn new(
        call_id: CallId,
        external_job_id: ExternalJobId,
        query: impl Into<String>,
        submitter_name: Option<String>,
        project_id: Option<ProjectId>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            call_id,
            external_job_id,
            query: query.into(),
            submitter_name,
            project_id,
            status: JobStatus::Submitted,
            poll_attempt: 0,
            result: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    /// The payload served by the "latest results" read path: the provider payload with
    /// the original query and call id on top.
    pub fn result_view(&self) -> Option<Value> {
        let result = self.result.as_ref()?;

        let mut view = serde_json::Map::new();
        view.insert("query".to_string(), Value::String(self.query.clone()));
        view.insert(
            "call_id".to_string(),
            Value::String(self.call_id.to_string()),
        );
        match result {
            Value::Object(fields) => {
                for (key, value) in fields {
                    view.insert(key.clone(), value.clone());
                }
            }
            other => {
                view.insert("results".to_string(), other.clone());
            }
        }

        Some(Value::Object(view))
    }
}
