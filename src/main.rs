//! Turnero Server — branch queue management for bank offices.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use turnero_api::state::AppState;
use turnero_core::config::AppConfig;
use turnero_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TURNERO_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Turnero v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let db = turnero_database::DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    turnero_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db.into_pool());

    // Background tasks: audit trail and room fan-out.
    let audit_task = turnero_service::AuditLogger::spawn(&state.bus);
    let broadcast_task = turnero_realtime::Broadcaster::spawn(
        &state.bus,
        state.rooms.clone(),
        state.socket_pool.clone(),
    );

    let app = turnero_api::router::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Turnero server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // The bus closes once the last publisher is dropped; give the
    // background tasks a bounded window to drain.
    let grace = std::time::Duration::from_secs(state.config.server.shutdown_grace_seconds);
    drop(state);
    let _ = tokio::time::timeout(grace, audit_task).await;
    let _ = tokio::time::timeout(grace, broadcast_task).await;

    tracing::info!("Turnero server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
