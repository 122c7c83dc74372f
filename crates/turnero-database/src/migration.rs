//! Embedded migration runner.

use sqlx::PgPool;
use tracing::info;

use turnero_core::error::{AppError, ErrorKind};

/// Applies any migrations not yet recorded in the target database.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database schema is up to date");
    Ok(())
}
