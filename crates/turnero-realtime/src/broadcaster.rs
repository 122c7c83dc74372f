//! Event-bus subscriber that fans domain events out to rooms.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use turnero_core::events::{DomainEvent, EventBus, TicketView};

use crate::connection::ConnectionPool;
use crate::registry::RoomRegistry;
use crate::room::Room;

/// Routes every published domain event to its rooms.
///
/// Delivery is fire-and-forget: an empty room is silently skipped and
/// a slow client only loses its own messages.
pub struct Broadcaster;

impl Broadcaster {
    /// Spawns the fan-out task.
    pub fn spawn(
        bus: &EventBus,
        rooms: Arc<RoomRegistry>,
        pool: Arc<ConnectionPool>,
    ) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => Self::dispatch(&rooms, &pool, &event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Broadcaster lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Sends one domain event to its queue, public, and operator rooms.
    fn dispatch(rooms: &RoomRegistry, pool: &ConnectionPool, event: &DomainEvent) {
        let view = event.payload.view();
        let name = event.payload.name();

        let queue_room = Room::Queue {
            branch_id: view.branch_id,
            service_id: view.service_id,
        };
        Self::deliver(rooms, pool, &queue_room.to_string(), name, view.clone());

        // Public displays never see the package code, whatever the event.
        let public_room = Room::Public {
            branch_id: view.branch_id,
            service_id: view.service_id,
        };
        Self::deliver(
            rooms,
            pool,
            &public_room.to_string(),
            name,
            view.public_subset(),
        );

        if let Some(operator_id) = event.actor_id {
            let operator_room = Room::Operator { operator_id };
            Self::deliver(rooms, pool, &operator_room.to_string(), name, view.clone());
        }
    }

    fn deliver(
        rooms: &RoomRegistry,
        pool: &ConnectionPool,
        room: &str,
        event: &str,
        ticket: TicketView,
    ) {
        let members = rooms.members(room);
        if members.is_empty() {
            return;
        }
        debug!(room, event, recipients = members.len(), "Broadcasting event");

        let message = crate::message::OutboundMessage::Event {
            room: room.to_string(),
            event: event.to_string(),
            ticket,
        };
        for conn_id in members {
            if let Some(handle) = pool.get(conn_id) {
                handle.send(&message);
            }
        }
    }
}
