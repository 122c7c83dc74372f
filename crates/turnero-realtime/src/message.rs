//! Inbound and outbound socket message definitions.

use serde::{Deserialize, Serialize};

use turnero_core::events::TicketView;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Join a room by wire name.
    Join {
        /// Room name, e.g. `public:{branch}:{service}`.
        room: String,
    },
    /// Leave a room.
    Leave {
        /// Room name.
        room: String,
    },
    /// Join every private room implied by the operator's current
    /// active window bindings, plus the operator's own room.
    JoinAssigned,
    /// Liveness probe.
    Ping {
        /// Echoed timestamp.
        timestamp: i64,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Room join confirmed.
    Joined {
        /// Room name.
        room: String,
    },
    /// Room leave confirmed.
    Left {
        /// Room name.
        room: String,
    },
    /// Ping response.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
    /// A domain event delivered to a room.
    Event {
        /// Room the event was routed to.
        room: String,
        /// Wire event name, e.g. `ticket:called`.
        event: String,
        /// Display payload.
        ticket: TicketView,
    },
    /// Request-level error.
    Error {
        /// Stable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl OutboundMessage {
    /// Serializes to the wire string, falling back to a static error
    /// body if serialization itself fails.
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"type":"error","code":"SERIALIZATION","message":"internal"}"#.to_string()
        })
    }
}
