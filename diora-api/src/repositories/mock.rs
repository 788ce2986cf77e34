//! In-memory repository for tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::models::{
    Expert, InvestorId, NewExpert, NewProject, Project, ProjectId, ProjectSearchState,
    SearchStatus,
};

use super::{ExpertRepository, ProjectRepository, RepositoryError};

#[derive(Debug, Clone, Default)]
struct ProjectRow {
    project: Option<Project>,
    expert_query: Option<String>,
    clado_status: Option<SearchStatus>,
    clado_polling_count: i32,
}

/// Mock repository backed by in-memory maps, implementing both repository traits.
///
/// Projects must be registered (with [`MockRepository::with_project`] or through
/// `create_project`) before status updates succeed, mirroring the `NotFound` behavior
/// of the Postgres implementation.
#[derive(Clone, Default)]
pub struct MockRepository {
    projects: Arc<RwLock<HashMap<ProjectId, ProjectRow>>>,
    experts: Arc<RwLock<Vec<NewExpert>>>,
    insert_calls: Arc<RwLock<usize>>,
    status_history: Arc<RwLock<Vec<(ProjectId, SearchStatus)>>>,
    fail_inserts: Arc<RwLock<bool>>,
    insert_delay: Arc<RwLock<Option<Duration>>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bare project row so status updates for it succeed.
    pub fn with_project(self, project_id: ProjectId) -> Self {
        self.projects
            .write()
            .unwrap()
            .insert(project_id, ProjectRow::default());
        self
    }

    /// Makes every `insert_experts` call fail.
    pub fn failing_inserts(self) -> Self {
        *self.fail_inserts.write().unwrap() = true;
        self
    }

    /// Makes every `insert_experts` call take `delay` before it lands.
    pub fn slow_inserts(self, delay: Duration) -> Self {
        *self.insert_delay.write().unwrap() = Some(delay);
        self
    }

    pub fn inserted_experts(&self) -> Vec<NewExpert> {
        self.experts.read().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        *self.insert_calls.read().unwrap()
    }

    /// Every status written, in order.
    pub fn status_history(&self) -> Vec<(ProjectId, SearchStatus)> {
        self.status_history.read().unwrap().clone()
    }

    pub fn status_of(&self, project_id: &ProjectId) -> Option<SearchStatus> {
        self.projects
            .read()
            .unwrap()
            .get(project_id)
            .and_then(|row| row.clado_status)
    }

    pub fn polling_count_of(&self, project_id: &ProjectId) -> Option<i32> {
        self.projects
            .read()
            .unwrap()
            .get(project_id)
            .map(|row| row.clado_polling_count)
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects
            .read()
            .unwrap()
            .values()
            .filter_map(|row| row.project.clone())
            .collect()
    }

    fn with_row<T>(
        &self,
        project_id: &ProjectId,
        f: impl FnOnce(&mut ProjectRow) -> T,
    ) -> Result<T, RepositoryError> {
        let mut projects = self.projects.write().unwrap();
        let row = projects
            .get_mut(project_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("project {}", project_id)))?;
        Ok(f(row))
    }
}

#[async_trait]
impl ExpertRepository for MockRepository {
    async fn insert_experts(&self, experts: &[NewExpert]) -> Result<usize, RepositoryError> {
        *self.insert_calls.write().unwrap() += 1;
        let delay = *self.insert_delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_inserts.read().unwrap() {
            return Err(RepositoryError::DatabaseError(sqlx::Error::PoolTimedOut));
        }

        self.experts.write().unwrap().extend_from_slice(experts);
        Ok(experts.len())
    }

    async fn experts_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Expert>, RepositoryError> {
        let mut experts: Vec<Expert> = self
            .experts
            .read()
            .unwrap()
            .iter()
            .filter(|e| &e.project_id == project_id)
            .map(|e| Expert {
                id: Uuid::new_v4(),
                project_id: e.project_id,
                name: e.name.clone(),
                linkedin_url: e.linkedin_url.clone(),
                headline: e.headline.clone(),
                summary: e.summary.clone(),
                reasoning: e.reasoning.clone(),
                for_query: e.for_query.clone(),
                rank: e.rank,
                raw_json: e.raw_json.clone(),
                stage: None,
                created_at: OffsetDateTime::now_utc(),
            })
            .collect();
        experts.sort_by_key(|e| e.rank);
        Ok(experts)
    }

    async fn start_search(
        &self,
        project_id: &ProjectId,
        query: &str,
    ) -> Result<(), RepositoryError> {
        self.with_row(project_id, |row| {
            row.expert_query = Some(query.to_string());
            row.clado_status = Some(SearchStatus::Pending);
            row.clado_polling_count = 0;
        })?;
        self.status_history
            .write()
            .unwrap()
            .push((*project_id, SearchStatus::Pending));
        Ok(())
    }

    async fn update_search_status(
        &self,
        project_id: &ProjectId,
        status: SearchStatus,
    ) -> Result<(), RepositoryError> {
        self.with_row(project_id, |row| row.clado_status = Some(status))?;
        self.status_history
            .write()
            .unwrap()
            .push((*project_id, status));
        Ok(())
    }

    async fn update_polling_count(
        &self,
        project_id: &ProjectId,
        count: i32,
    ) -> Result<(), RepositoryError> {
        self.with_row(project_id, |row| row.clado_polling_count = count)
    }

    async fn search_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectSearchState>, RepositoryError> {
        let expert_count = self
            .experts
            .read()
            .unwrap()
            .iter()
            .filter(|e| &e.project_id == project_id)
            .count() as i64;

        Ok(self
            .projects
            .read()
            .unwrap()
            .get(project_id)
            .map(|row| ProjectSearchState {
                project_id: *project_id,
                expert_query: row.expert_query.clone(),
                clado_status: row.clado_status,
                clado_polling_count: row.clado_polling_count,
                expert_count,
            }))
    }
}

#[async_trait]
impl ProjectRepository for MockRepository {
    async fn find_by_slug(
        &self,
        investor_id: &InvestorId,
        slug: &str,
    ) -> Result<Option<Project>, RepositoryError> {
        Ok(self.projects().into_iter().find(|p| {
            &p.investor_id == investor_id && p.slug == slug
        }))
    }

    async fn create_project(
        &self,
        project: &NewProject,
        slug: &str,
    ) -> Result<Project, RepositoryError> {
        let created = Project {
            id: ProjectId::new(Uuid::new_v4()),
            investor_id: project.investor_id,
            name: project.name.clone(),
            slug: slug.to_string(),
            description: project.description.clone(),
            questions: project.questions.clone(),
            questions_done: project.questions_done,
            created_at: OffsetDateTime::now_utc(),
        };

        self.projects.write().unwrap().insert(
            created.id,
            ProjectRow {
                project: Some(created.clone()),
                ..Default::default()
            },
        );

        Ok(created)
    }
}
