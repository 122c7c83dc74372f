//! Audit trail of domain events.
//!
//! A bus subscriber that records every published event through
//! `tracing`. Lagging only drops audit lines, never business state.

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use turnero_core::events::EventBus;

/// Structured audit logger fed by the event bus.
pub struct AuditLogger;

impl AuditLogger {
    /// Spawns the audit subscriber task.
    pub fn spawn(bus: &EventBus) -> tokio::task::JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let view = event.payload.view();
                        info!(
                            target: "turnero::audit",
                            event = event.payload.name(),
                            ticket_id = %view.id,
                            code = %view.code,
                            status = %view.status,
                            actor_id = ?event.actor_id,
                            "Domain event"
                        );
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "turnero::audit", skipped, "Audit log lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
