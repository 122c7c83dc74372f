//! Domain events emitted by Turnero queue operations.
//!
//! Events are published on the [`bus::EventBus`] and consumed by the
//! real-time broadcaster and the audit logger. Services never talk to
//! sockets directly; the bus is the only fan-out path.

pub mod bus;
pub mod ticket;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use ticket::{TicketEvent, TicketView};

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The operator who caused the event (if any).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: TicketEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: TicketEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
