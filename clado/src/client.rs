use reqwest::RequestBuilder;
use serde_json::Value;
use thiserror::Error;

use crate::{CladoURL, DeepResearchJob, DeepResearchRequest, DeepResearchStatus};

#[derive(Clone)]
pub struct CladoClient {
    http: reqwest::Client,
    api_key: String,
    base_url: CladoURL,
}

impl CladoClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: CladoURL::new(base_url),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, CladoError> {
        let resp = request
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| CladoError::RequestError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CladoError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>().await.map_err(|e| {
            CladoError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })
    }

    /// Submits a deep-research query, returning the job to poll.
    pub async fn start_deep_research(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<DeepResearchJob, CladoError> {
        let url = self.base_url.append_path("/deep_research");
        let request = self
            .http
            .post(url.as_ref())
            .json(&DeepResearchRequest { query, limit });

        let body = self.send(request).await?;
        let job = DeepResearchJob::from_response(&body)?;
        tracing::debug!(job_id = %job.job_id, "Clado deep research started");

        Ok(job)
    }

    pub async fn fetch_deep_research(
        &self,
        job_id: &str,
    ) -> Result<DeepResearchStatus, CladoError> {
        let url = self
            .base_url
            .append_path("/deep_research")
            .append_path(job_id);

        let body = self.send(self.http.get(url.as_ref())).await?;

        Ok(DeepResearchStatus::from_response(body))
    }
}

#[derive(Error, Debug)]
pub enum CladoError {
    #[error("RequestError: {0}")]
    RequestError(String),
    #[error("StatusError: {status}: {body}")]
    StatusError { status: u16, body: String },
    #[error("ParsingError: {0}")]
    ParsingError(String),
    #[error("No job id returned from Clado")]
    MissingJobId,
}

impl CladoError {
    /// Whether the request never produced a usable HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestError(_) | Self::StatusError { .. })
    }
}
