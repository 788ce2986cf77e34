use serde::Serialize;

use super::{CallId, ExternalJobId, Project, ProjectId};

/// A request to start an expert search.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// Caller-supplied correlation id; generated when absent.
    pub call_id: Option<CallId>,
    pub submitter_name: Option<String>,
    pub project_id: Option<ProjectId>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_call_id(mut self, call_id: CallId) -> Self {
        self.call_id = Some(call_id);
        self
    }

    pub fn for_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

/// Returned as soon as the provider has accepted the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchAccepted {
    pub call_id: CallId,
    pub search_id: ExternalJobId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreated {
    pub project: Project,
    /// Query derived from the transcript, absent for fallback projects.
    pub expert_search_query: Option<String>,
    /// The search started for the new project, if one could be started.
    pub search: Option<SearchAccepted>,
}
