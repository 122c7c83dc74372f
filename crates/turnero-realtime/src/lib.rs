//! # turnero-realtime
//!
//! In-process realtime engine: room registry, connection lifecycle,
//! join authorization, and the event-bus subscriber that fans domain
//! events out to rooms.
//!
//! Registry state is purely in-memory and ephemeral; a reconnecting
//! client re-derives its membership from scratch. Delivery is
//! fire-and-forget; clients reconcile through pull queries.

pub mod broadcaster;
pub mod connection;
pub mod message;
pub mod policy;
pub mod registry;
pub mod room;

pub use broadcaster::Broadcaster;
pub use connection::{ConnectionHandle, ConnectionId, ConnectionManager, ConnectionPool};
pub use message::{InboundMessage, OutboundMessage};
pub use policy::{RoomPolicy, StoreRoomPolicy};
pub use registry::RoomRegistry;
pub use room::Room;
