//! Composition root: the only place that knows the concrete adapters.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    adapters::outbound::{clado::CladoSearchGateway, openrouter::OpenRouterAnalyzer},
    app_state::AppState,
    config::Settings,
    domain::{
        ports::outbound::SearchGateway,
        services::{ExpertSearchServiceImpl, ProjectServiceImpl},
    },
    repositories::{ExpertRepositoryImpl, ProjectRepositoryImpl},
};

pub fn build_app_state(settings: &Settings, pool: PgPool) -> AppState {
    let gateway = match settings.clado.api_key() {
        Some(api_key) => {
            let client = clado::CladoClient::new(api_key, settings.clado.base_url.as_str());
            Some(Arc::new(CladoSearchGateway::new(client)) as Arc<dyn SearchGateway>)
        }
        None => {
            tracing::warn!("Clado API key not configured, searches will be rejected");
            None
        }
    };

    let expert_search = Arc::new(ExpertSearchServiceImpl::new(
        gateway,
        Arc::new(ExpertRepositoryImpl::new(pool.clone())),
        settings.expert_search(),
    ));

    let analyzer = OpenRouterAnalyzer::new(
        settings.llm.api_key.clone(),
        settings.llm.base_url.as_str(),
        settings.llm.model.as_str(),
    );
    let projects = Arc::new(ProjectServiceImpl::new(
        Arc::new(analyzer),
        Arc::new(ProjectRepositoryImpl::new(pool)),
        expert_search.clone(),
    ));

    AppState::new(expert_search, projects)
}
