mod expert;
mod ids;
mod project;
mod requests;
mod search_job;

pub use expert::*;
pub use ids::*;
pub use project::*;
pub use requests::*;
pub use search_job::*;
