mod expert_search;
mod projects;

pub use expert_search::{ExpertSearchConfig, ExpertSearchServiceImpl};
pub use projects::ProjectServiceImpl;
