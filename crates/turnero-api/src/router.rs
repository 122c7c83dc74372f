//! Route definitions for the Turnero HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(ticket_routes())
        .merge(queue_routes())
        .merge(public_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Ticket issuance (unauthenticated; kiosks use these).
fn ticket_routes() -> Router<AppState> {
    Router::new().route("/tickets", post(handlers::tickets::create_ticket))
}

/// Operator queue lifecycle endpoints (bearer token required).
fn queue_routes() -> Router<AppState> {
    Router::new()
        .route("/queue", get(handlers::queue::snapshot))
        .route("/queue/call-next", post(handlers::queue::call_next))
        .route("/queue/{ticket_id}/recall", patch(handlers::queue::recall))
        .route("/queue/{ticket_id}/start", patch(handlers::queue::start))
        .route("/queue/{ticket_id}/hold", patch(handlers::queue::hold))
        .route("/queue/{ticket_id}/finish", patch(handlers::queue::finish))
        .route("/queue/{ticket_id}/cancel", patch(handlers::queue::cancel))
}

/// Catalog and display-board endpoints (no auth required).
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/public/branches", get(handlers::public::list_branches))
        .route(
            "/public/branches/{branch_id}/services",
            get(handlers::public::list_branch_services),
        )
        .route(
            "/public/display-calls",
            get(handlers::public::display_calls),
        )
}

/// Health check endpoint (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Build CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
