//! Scripted port implementations for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::models::{ExternalJobId, ProjectAnalysis};

use super::{
    AnalysisError, GatewayError, SearchGateway, StatusReport, TranscriptAnalyzer, UpstreamStatus,
};

/// Search gateway whose status responses are played back from a script.
///
/// Once the script runs out every poll reports `processing`.
#[derive(Clone, Default)]
pub struct MockSearchGateway {
    submit_results: Arc<Mutex<VecDeque<Result<ExternalJobId, GatewayError>>>>,
    statuses: Arc<Mutex<VecDeque<Result<StatusReport, GatewayError>>>>,
    submitted: Arc<Mutex<Vec<(String, u32)>>>,
    polled: Arc<Mutex<Vec<ExternalJobId>>>,
}

impl MockSearchGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job_id(self, job_id: &str) -> Self {
        self.submit_results
            .lock()
            .unwrap()
            .push_back(Ok(ExternalJobId::new(job_id)));
        self
    }

    pub fn with_submit_error(self, err: GatewayError) -> Self {
        self.submit_results.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn then_status(self, payload: Value) -> Self {
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let status = match status {
            "completed" | "success" => UpstreamStatus::Succeeded,
            "failed" | "error" => UpstreamStatus::Failed,
            other => UpstreamStatus::Pending(other.to_string()),
        };
        self.statuses
            .lock()
            .unwrap()
            .push_back(Ok(StatusReport { status, payload }));
        self
    }

    pub fn then_processing(self, times: usize) -> Self {
        (0..times).fold(self, |gateway, _| {
            gateway.then_status(json!({ "status": "processing" }))
        })
    }

    pub fn then_error(self, err: GatewayError) -> Self {
        self.statuses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn submit_calls(&self) -> Vec<(String, u32)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.polled.lock().unwrap().len()
    }

    pub fn polled_jobs(&self) -> Vec<ExternalJobId> {
        self.polled.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchGateway for MockSearchGateway {
    async fn submit(&self, query: &str, limit: u32) -> Result<ExternalJobId, GatewayError> {
        self.submitted
            .lock()
            .unwrap()
            .push((query.to_string(), limit));

        let submitted = self.submitted.lock().unwrap().len();
        self.submit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ExternalJobId::new(format!("job-{}", submitted))))
    }

    async fn get_status(&self, job_id: &ExternalJobId) -> Result<StatusReport, GatewayError> {
        self.polled.lock().unwrap().push(job_id.clone());

        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(StatusReport {
                    status: UpstreamStatus::Pending("processing".to_string()),
                    payload: json!({ "status": "processing" }),
                })
            })
    }
}

#[derive(Clone)]
pub struct MockTranscriptAnalyzer {
    analysis: Option<ProjectAnalysis>,
}

impl MockTranscriptAnalyzer {
    pub fn returning(analysis: ProjectAnalysis) -> Self {
        Self {
            analysis: Some(analysis),
        }
    }

    pub fn failing() -> Self {
        Self { analysis: None }
    }
}

#[async_trait]
impl TranscriptAnalyzer for MockTranscriptAnalyzer {
    async fn analyze(&self, _transcript: &str) -> Result<ProjectAnalysis, AnalysisError> {
        self.analysis
            .clone()
            .ok_or_else(|| AnalysisError::Request("model unavailable".to_string()))
    }
}
