//! Queue orchestration.

pub mod orchestrator;

pub use orchestrator::{QueueService, QueueSnapshot};
