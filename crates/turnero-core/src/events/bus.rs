//! In-process typed event bus.
//!
//! A thin wrapper over `tokio::sync::broadcast`. Publishing is
//! fire-and-forget: a bus with no subscribers drops the event, which is
//! the intended behavior for realtime notifications (clients reconcile
//! through pull queries).

use tokio::sync::broadcast;
use tracing::debug;

use super::DomainEvent;

/// Typed publish/subscribe bus for [`DomainEvent`]s.
///
/// The realtime broadcaster is one subscriber; the audit logger is
/// another. Cloning the bus is cheap and shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Creates a bus with the given broadcast capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Delivery is best-effort; an error (no receivers) is not a
    /// business failure and is ignored.
    pub fn publish(&self, event: DomainEvent) {
        let name = event.payload.name();
        match self.tx.send(event) {
            Ok(n) => debug!(event = name, subscribers = n, "Event published"),
            Err(_) => debug!(event = name, "Event dropped: no subscribers"),
        }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}
