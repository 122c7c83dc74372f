//! # turnero-service
//!
//! Business logic layer. The queue orchestrator and ticket issuance
//! drive the store traits and publish domain events to the bus; they
//! never talk to sockets directly.
//!
//! Services follow constructor injection — all dependencies are
//! provided at construction time via `Arc` references.

pub mod audit;
pub mod context;
pub mod issuance;
pub mod queue;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::AuditLogger;
pub use context::OperatorContext;
pub use issuance::IssuanceService;
pub use queue::{QueueService, QueueSnapshot};
pub use store::{AssignmentStore, CatalogStore, DisplayStore, TicketStore};
