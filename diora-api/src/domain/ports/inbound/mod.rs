mod expert_search;
mod projects;

pub use expert_search::*;
pub use projects::*;
