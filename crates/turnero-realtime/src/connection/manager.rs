//! Connection manager: registration, teardown, inbound routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use turnero_core::config::RealtimeConfig;
use turnero_service::context::OperatorContext;

use crate::message::{InboundMessage, OutboundMessage};
use crate::policy::RoomPolicy;
use crate::registry::RoomRegistry;
use crate::room::Room;

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Manages all active socket connections.
pub struct ConnectionManager {
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Room registry.
    rooms: Arc<RoomRegistry>,
    /// Join authorization.
    policy: Arc<dyn RoomPolicy>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        policy: Arc<dyn RoomPolicy>,
        config: RealtimeConfig,
    ) -> Self {
        Self {
            pool,
            rooms,
            policy,
            config,
        }
    }

    /// Registers a new connection, returning the handle and the
    /// receiver the socket writer drains.
    ///
    /// An operator at the per-identity connection cap has their oldest
    /// connection replaced.
    pub fn register(
        &self,
        identity: Option<OperatorContext>,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity, tx));

        if let Some(operator_id) = handle.operator_id() {
            let existing = self.pool.operator_connections(operator_id);
            if existing.len() >= self.config.max_connections_per_operator {
                if let Some(oldest) = existing.first() {
                    warn!(
                        operator_id = %operator_id,
                        replaced = %oldest.id,
                        "Operator at connection cap, replacing oldest connection"
                    );
                    self.unregister(oldest.id);
                }
            }
        }

        self.pool.add(handle.clone());
        info!(
            conn_id = %handle.id,
            operator_id = ?handle.operator_id(),
            "Socket connection registered"
        );
        (handle, rx)
    }

    /// Tears a connection down and clears its room memberships.
    pub fn unregister(&self, conn_id: ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.rooms.unsubscribe_all(conn_id);
            info!(conn_id = %conn_id, "Socket connection unregistered");
        }
    }

    /// Processes one inbound wire message from a client.
    pub async fn handle_inbound(&self, conn_id: ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        let message: InboundMessage = match serde_json::from_str(raw) {
            Ok(m) => m,
            Err(e) => {
                handle.send(&OutboundMessage::Error {
                    code: "INVALID_MESSAGE".to_string(),
                    message: format!("Failed to parse message: {e}"),
                });
                return;
            }
        };

        match message {
            InboundMessage::Join { room } => self.handle_join(&handle, &room).await,
            InboundMessage::Leave { room } => {
                self.rooms.unsubscribe(&room, handle.id);
                handle.send(&OutboundMessage::Left { room });
            }
            InboundMessage::JoinAssigned => self.handle_join_assigned(&handle).await,
            InboundMessage::Ping { timestamp } => {
                handle.send(&OutboundMessage::Pong { timestamp });
            }
        }
    }

    /// Handles an explicit room join, re-validating authorization
    /// against current state.
    async fn handle_join(&self, handle: &Arc<ConnectionHandle>, name: &str) {
        let Some(room) = Room::parse(name) else {
            handle.send(&OutboundMessage::Error {
                code: "INVALID_ROOM".to_string(),
                message: format!("Unknown room name: {name}"),
            });
            return;
        };

        let allowed = match self.policy.can_join(handle.identity.as_ref(), &room).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!(conn_id = %handle.id, room = %room, error = %e, "Join check failed");
                false
            }
        };
        if !allowed {
            handle.send(&OutboundMessage::Error {
                code: "FORBIDDEN".to_string(),
                message: format!("Not allowed to join {room}"),
            });
            return;
        }

        self.rooms.subscribe(room.to_string(), handle.id);
        debug!(conn_id = %handle.id, room = %room, "Joined room");
        handle.send(&OutboundMessage::Joined {
            room: room.to_string(),
        });
    }

    /// Joins every private room implied by the operator's current
    /// active bindings.
    async fn handle_join_assigned(&self, handle: &Arc<ConnectionHandle>) {
        let Some(operator_id) = handle.operator_id() else {
            handle.send(&OutboundMessage::Error {
                code: "UNAUTHENTICATED".to_string(),
                message: "Private rooms require an authenticated socket".to_string(),
            });
            return;
        };

        let rooms = match self.policy.assigned_rooms(operator_id).await {
            Ok(rooms) => rooms,
            Err(e) => {
                warn!(conn_id = %handle.id, error = %e, "Assigned-room lookup failed");
                handle.send(&OutboundMessage::Error {
                    code: "INTERNAL".to_string(),
                    message: "Could not resolve assigned rooms".to_string(),
                });
                return;
            }
        };

        for room in rooms {
            self.rooms.subscribe(room.to_string(), handle.id);
            handle.send(&OutboundMessage::Joined {
                room: room.to_string(),
            });
        }
    }

    /// The room registry backing this manager.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.rooms.clone()
    }

    /// The connection pool backing this manager.
    pub fn pool(&self) -> Arc<ConnectionPool> {
        self.pool.clone()
    }

    /// Number of active connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}
