mod expert_repo;
#[cfg(test)]
mod mock;
mod project_repo;
mod repo_error;

pub use expert_repo::*;
#[cfg(test)]
pub use mock::MockRepository;
pub use project_repo::*;
pub use repo_error::RepositoryError;
