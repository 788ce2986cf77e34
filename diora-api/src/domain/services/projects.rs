use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    domain::{
        models::{
            generate_placeholder_name, generate_slug, unix_millis, CallId, InvestorId,
            NewProject, Project, ProjectCreated, SearchRequest,
        },
        ports::{
            inbound::{ExpertSearchService, ProjectService},
            outbound::TranscriptAnalyzer,
        },
        ProjectError,
    },
    repositories::ProjectRepository,
};

const FALLBACK_DESCRIPTION: &str = "Project created from voice call - AI analysis unavailable";
const EXPECTED_QUESTIONS: usize = 10;

pub struct ProjectServiceImpl {
    analyzer: Arc<dyn TranscriptAnalyzer>,
    repository: Arc<dyn ProjectRepository>,
    searches: Arc<dyn ExpertSearchService>,
}

impl ProjectServiceImpl {
    pub fn new(
        analyzer: Arc<dyn TranscriptAnalyzer>,
        repository: Arc<dyn ProjectRepository>,
        searches: Arc<dyn ExpertSearchService>,
    ) -> Self {
        Self {
            analyzer,
            repository,
            searches,
        }
    }

    async fn create_project(&self, project: NewProject) -> Result<Project, ProjectError> {
        let slug = generate_slug(&project.name);
        if slug.is_empty() {
            return Err(ProjectError::InvalidRequest(format!(
                "Project name \"{}\" has no usable characters",
                project.name
            )));
        }

        if let Some(existing) = self
            .repository
            .find_by_slug(&project.investor_id, &slug)
            .await?
        {
            return Err(ProjectError::SlugConflict(existing.name));
        }

        let created = self.repository.create_project(&project, &slug).await?;
        tracing::info!(project_id = %created.id, slug = %created.slug, "Project created");

        Ok(created)
    }
}

#[async_trait]
impl ProjectService for ProjectServiceImpl {
    #[instrument(name = "ProjectService::create_from_transcript", skip(self, transcript))]
    async fn create_from_transcript(
        &self,
        transcript: &str,
        investor_id: InvestorId,
    ) -> Result<ProjectCreated, ProjectError> {
        if transcript.trim().is_empty() {
            return Err(ProjectError::InvalidRequest(
                "transcript is required".to_string(),
            ));
        }

        let analysis = match self.analyzer.analyze(transcript).await {
            Ok(analysis) if analysis.questions.len() == EXPECTED_QUESTIONS => analysis,
            Ok(analysis) => {
                tracing::warn!(
                    "Expected {} questions, got {}; falling back to basic project",
                    EXPECTED_QUESTIONS,
                    analysis.questions.len()
                );
                return self.create_fallback(transcript, investor_id).await;
            }
            Err(e) => {
                tracing::warn!("Transcript analysis failed, falling back to basic project: {}", e);
                return self.create_fallback(transcript, investor_id).await;
            }
        };

        let project = self
            .create_project(NewProject {
                investor_id,
                name: analysis.project_title,
                description: analysis.project_description,
                questions: analysis.questions,
                questions_done: false,
            })
            .await?;

        let query = analysis.expert_search_query.trim().to_string();
        let search = if query.is_empty() {
            None
        } else {
            let call_id = CallId::new(format!("auto-{}-{}", project.id, unix_millis()));
            let request = SearchRequest::new(query.clone())
                .with_call_id(call_id)
                .for_project(project.id);

            match self.searches.start_search(request).await {
                Ok(accepted) => Some(accepted),
                Err(e) => {
                    tracing::error!("Failed to start expert search for project {}: {}", project.id, e);
                    None
                }
            }
        };

        Ok(ProjectCreated {
            project,
            expert_search_query: (!query.is_empty()).then_some(query),
            search,
        })
    }
}

impl ProjectServiceImpl {
    async fn create_fallback(
        &self,
        transcript: &str,
        investor_id: InvestorId,
    ) -> Result<ProjectCreated, ProjectError> {
        let conversation = transcript
            .strip_prefix("AI:")
            .map(str::trim_start)
            .unwrap_or(transcript);

        let project = self
            .create_project(NewProject {
                investor_id,
                name: generate_placeholder_name(),
                description: FALLBACK_DESCRIPTION.to_string(),
                questions: vec![conversation.to_string()],
                questions_done: false,
            })
            .await?;

        Ok(ProjectCreated {
            project,
            expert_search_query: None,
            search: None,
        })
    }
}
