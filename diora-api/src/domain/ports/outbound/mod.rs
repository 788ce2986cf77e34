#[cfg(test)]
mod mock;
mod search_gateway;
mod transcript_analyzer;

#[cfg(test)]
pub use mock::*;
pub use search_gateway::*;
pub use transcript_analyzer::*;
