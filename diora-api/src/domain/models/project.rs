use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{InvestorId, ProjectId};

/// Search state persisted on the project row, so the job lifecycle survives restarts
/// and can be polled by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "clado_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Pending,
    Polling,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSearchState {
    pub project_id: ProjectId,
    pub expert_query: Option<String>,
    pub clado_status: Option<SearchStatus>,
    pub clado_polling_count: i32,
    pub expert_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub investor_id: InvestorId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub questions: Vec<String>,
    pub questions_done: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub investor_id: InvestorId,
    pub name: String,
    pub description: String,
    pub questions: Vec<String>,
    pub questions_done: bool,
}

/// Structured brief derived from a call transcript.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectAnalysis {
    pub project_title: String,
    pub project_description: String,
    pub questions: Vec<String>,
    pub expert_search_query: String,
}

/// Lowercase, ascii alphanumerics separated by single hyphens.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.trim().to_lowercase().chars() {
        let c = match c {
            'a'..='z' | '0'..='9' | '-' => c,
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    slug.trim_matches('-').to_string()
}

/// Name for projects created without an analysed title: `test-<12 digit number>`.
pub fn generate_placeholder_name() -> String {
    let number = Uuid::new_v4().as_u128() % 1_000_000_000_000;
    format!("test-{:012}", number)
}
