//! # turnero-database
//!
//! PostgreSQL connection management, the advisory-lock ticket code
//! sequencer, and concrete repository implementations for all Turnero
//! entities.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod sequencer;

pub use connection::DatabasePool;
