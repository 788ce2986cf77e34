use std::sync::Arc;

use crate::domain::ports::inbound::{ExpertSearchService, ProjectService};

#[derive(Clone)]
pub struct AppState {
    expert_search: Arc<dyn ExpertSearchService>,
    projects: Arc<dyn ProjectService>,
}

impl AppState {
    pub fn new(
        expert_search: Arc<dyn ExpertSearchService>,
        projects: Arc<dyn ProjectService>,
    ) -> Self {
        Self {
            expert_search,
            projects,
        }
    }

    pub fn expert_search(&self) -> &dyn ExpertSearchService {
        self.expert_search.as_ref()
    }

    pub fn projects(&self) -> &dyn ProjectService {
        self.projects.as_ref()
    }
}
