use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use crate::domain::models::{Expert, NewExpert, ProjectId, ProjectSearchState, SearchStatus};

use super::repo_error::RepositoryError;

/// Storage the search pipeline writes ranked experts and job status into.
#[async_trait]
pub trait ExpertRepository: Send + Sync + 'static {
    /// Inserts all experts in one statement. Returns the number of inserted rows.
    async fn insert_experts(&self, experts: &[NewExpert]) -> Result<usize, RepositoryError>;
    /// Experts of a project ordered by rank.
    async fn experts_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Expert>, RepositoryError>;
    /// Records a newly submitted search: query, `pending` status and a reset poll count.
    async fn start_search(&self, project_id: &ProjectId, query: &str)
        -> Result<(), RepositoryError>;
    async fn update_search_status(
        &self,
        project_id: &ProjectId,
        status: SearchStatus,
    ) -> Result<(), RepositoryError>;
    async fn update_polling_count(
        &self,
        project_id: &ProjectId,
        count: i32,
    ) -> Result<(), RepositoryError>;
    async fn search_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectSearchState>, RepositoryError>;
}

#[derive(Clone)]
pub struct ExpertRepositoryImpl {
    pool: PgPool,
}

impl ExpertRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpertRepository for ExpertRepositoryImpl {
    async fn insert_experts(&self, experts: &[NewExpert]) -> Result<usize, RepositoryError> {
        if experts.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO experts (project_id, name, linkedin_url, headline, summary, reasoning, for_query, rank, raw_json) ",
        );
        builder.push_values(experts, |mut row, expert| {
            row.push_bind(expert.project_id)
                .push_bind(&expert.name)
                .push_bind(&expert.linkedin_url)
                .push_bind(&expert.headline)
                .push_bind(&expert.summary)
                .push_bind(&expert.reasoning)
                .push_bind(&expert.for_query)
                .push_bind(expert.rank)
                .push_bind(Json(&expert.raw_json));
        });

        let result = builder.build().execute(&self.pool).await?;

        Ok(result.rows_affected() as usize)
    }

    async fn experts_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Expert>, RepositoryError> {
        let experts = sqlx::query_as::<_, Expert>(
            r#"
            SELECT id, project_id, name, linkedin_url, headline, summary, reasoning, for_query, rank, raw_json, stage, created_at
            FROM experts
            WHERE project_id = $1
            ORDER BY rank ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(experts)
    }

    async fn start_search(
        &self,
        project_id: &ProjectId,
        query: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET expert_query = $1, clado_status = $2, clado_polling_count = 0
            WHERE id = $3
            "#,
        )
        .bind(query)
        .bind(SearchStatus::Pending)
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), project_id)
    }

    async fn update_search_status(
        &self,
        project_id: &ProjectId,
        status: SearchStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET clado_status = $1
            WHERE id = $2
            "#,
        )
        .bind(status)
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), project_id)
    }

    async fn update_polling_count(
        &self,
        project_id: &ProjectId,
        count: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET clado_polling_count = $1
            WHERE id = $2
            "#,
        )
        .bind(count)
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), project_id)
    }

    async fn search_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectSearchState>, RepositoryError> {
        let state = sqlx::query_as::<_, ProjectSearchState>(
            r#"
            SELECT
                p.id AS project_id,
                p.expert_query,
                p.clado_status,
                p.clado_polling_count,
                (SELECT COUNT(*) FROM experts e WHERE e.project_id = p.id) AS expert_count
            FROM projects p
            WHERE p.id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }
}

fn ensure_updated(rows_affected: u64, project_id: &ProjectId) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        return Err(RepositoryError::NotFound(format!("project {}", project_id)));
    }
    Ok(())
}
