//! HTTP and WebSocket request handlers.

pub mod health;
pub mod public;
pub mod queue;
pub mod tickets;
pub mod ws;
