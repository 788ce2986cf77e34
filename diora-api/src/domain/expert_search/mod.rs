//! The search-and-ingest pipeline: job tracking, polling and result projection.

mod job_store;
mod poller;
mod projector;
mod scheduler;

pub use job_store::JobStore;
pub use poller::{SearchPoller, TickOutcome};
pub use projector::project_experts;
pub use scheduler::{PollerMessage, PollingScheduler};
