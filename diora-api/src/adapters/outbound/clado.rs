use async_trait::async_trait;

use crate::domain::{
    models::ExternalJobId,
    ports::outbound::{GatewayError, SearchGateway, StatusReport, UpstreamStatus},
};

/// Adapter that wraps the Clado client to implement the SearchGateway port.
pub struct CladoSearchGateway {
    client: clado::CladoClient,
}

impl CladoSearchGateway {
    pub fn new(client: clado::CladoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchGateway for CladoSearchGateway {
    async fn submit(&self, query: &str, limit: u32) -> Result<ExternalJobId, GatewayError> {
        let job = self
            .client
            .start_deep_research(query, limit)
            .await
            .map_err(map_clado_error)?;

        Ok(ExternalJobId::new(job.job_id))
    }

    async fn get_status(&self, job_id: &ExternalJobId) -> Result<StatusReport, GatewayError> {
        let status = self
            .client
            .fetch_deep_research(job_id.as_str())
            .await
            .map_err(map_clado_error)?;

        Ok(to_status_report(status))
    }
}

fn to_status_report(status: clado::DeepResearchStatus) -> StatusReport {
    let status_kind = match status.state {
        clado::JobState::Completed => UpstreamStatus::Succeeded,
        clado::JobState::Failed => UpstreamStatus::Failed,
        clado::JobState::Running(raw) => UpstreamStatus::Pending(raw),
    };

    StatusReport {
        status: status_kind,
        payload: status.body,
    }
}

fn map_clado_error(e: clado::CladoError) -> GatewayError {
    if e.is_transport() {
        GatewayError::Unavailable(e.to_string())
    } else {
        GatewayError::Protocol(e.to_string())
    }
}
