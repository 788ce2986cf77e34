use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::models::{InvestorId, NewProject, Project};

use super::repo_error::RepositoryError;

#[async_trait]
pub trait ProjectRepository: Send + Sync + 'static {
    async fn find_by_slug(
        &self,
        investor_id: &InvestorId,
        slug: &str,
    ) -> Result<Option<Project>, RepositoryError>;
    async fn create_project(
        &self,
        project: &NewProject,
        slug: &str,
    ) -> Result<Project, RepositoryError>;
}

#[derive(Clone)]
pub struct ProjectRepositoryImpl {
    pool: PgPool,
}

impl ProjectRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for ProjectRepositoryImpl {
    async fn find_by_slug(
        &self,
        investor_id: &InvestorId,
        slug: &str,
    ) -> Result<Option<Project>, RepositoryError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, investor_id, name, slug, description, questions, questions_done, created_at
            FROM projects
            WHERE investor_id = $1 AND slug = $2
            "#,
        )
        .bind(investor_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn create_project(
        &self,
        project: &NewProject,
        slug: &str,
    ) -> Result<Project, RepositoryError> {
        let created = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (investor_id, name, slug, description, questions, questions_done)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, investor_id, name, slug, description, questions, questions_done, created_at
            "#,
        )
        .bind(project.investor_id)
        .bind(&project.name)
        .bind(slug)
        .bind(&project.description)
        .bind(&project.questions)
        .bind(project.questions_done)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
