//! Custom axum extractors.

pub mod auth;

pub use auth::AuthOperator;
