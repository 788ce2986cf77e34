use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::ProjectId;

/// An expert candidate ready to be inserted, one per provider result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpert {
    pub project_id: ProjectId,
    pub name: String,
    pub linkedin_url: String,
    pub headline: String,
    pub summary: String,
    pub reasoning: String,
    pub for_query: String,
    /// 1-based position in the provider's result ordering.
    pub rank: i32,
    /// Deep copy of the provider's candidate object.
    pub raw_json: Value,
}

/// A persisted expert. `stage` is owned by the UI and never written here.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    pub id: Uuid,
    pub project_id: ProjectId,
    pub name: String,
    pub linkedin_url: String,
    pub headline: String,
    pub summary: String,
    pub reasoning: String,
    pub for_query: String,
    pub rank: i32,
    pub raw_json: Value,
    pub stage: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
