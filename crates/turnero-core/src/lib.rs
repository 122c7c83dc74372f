//! # turnero-core
//!
//! Core crate for the Turnero branch queueing service. Contains the
//! configuration schemas, domain events and the in-process event bus,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Turnero crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
