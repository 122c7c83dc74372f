//! # turnero-api
//!
//! HTTP layer built on Axum: REST endpoints, WebSocket upgrade, the
//! auth extractor, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
