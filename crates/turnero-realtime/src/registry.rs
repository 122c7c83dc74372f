//! Room registry with a reverse index per connection.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::ConnectionId;

/// Registry of all active rooms and their members.
///
/// Purely in-memory; membership disappears with the process and is
/// re-derived on reconnect.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connection IDs.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Connection ID → room names (reverse index).
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room.
    pub fn subscribe(&self, room: String, conn_id: ConnectionId) {
        self.rooms.entry(room.clone()).or_default().insert(conn_id);
        self.memberships.entry(conn_id).or_default().insert(room);
    }

    /// Removes a connection from a room.
    pub fn unsubscribe(&self, room: &str, conn_id: ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&conn_id);
            if members.is_empty() {
                drop(members);
                self.rooms.remove(room);
            }
        }
        if let Some(mut rooms) = self.memberships.get_mut(&conn_id) {
            rooms.remove(room);
        }
    }

    /// Removes a connection from every room it joined.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        let rooms = self
            .memberships
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();
        for room in &rooms {
            if let Some(mut members) = self.rooms.get_mut(room) {
                members.remove(&conn_id);
                if members.is_empty() {
                    drop(members);
                    self.rooms.remove(room);
                }
            }
        }
    }

    /// Member connection IDs of a room; empty for unknown rooms.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.memberships
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
