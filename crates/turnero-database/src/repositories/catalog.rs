//! Branch and service catalog reads for the public surface.

use sqlx::PgPool;
use uuid::Uuid;

use turnero_core::error::{AppError, ErrorKind};
use turnero_core::result::AppResult;
use turnero_entity::catalog::{Branch, Service};

/// Read-only repository for the branch/service catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All active branches, alphabetically.
    pub async fn active_branches(&self) -> AppResult<Vec<Branch>> {
        sqlx::query_as::<_, Branch>(
            "SELECT * FROM branches WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list branches", e))
    }

    /// Find an active branch by ID.
    pub async fn find_branch(&self, branch_id: Uuid) -> AppResult<Option<Branch>> {
        sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1 AND is_active = TRUE")
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find branch", e))
    }

    /// Find an active service by ID.
    pub async fn find_service(&self, service_id: Uuid) -> AppResult<Option<Service>> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1 AND is_active = TRUE")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find service", e))
    }

    /// Active services attendable at a branch: those bound to at least
    /// one active window of the branch.
    pub async fn services_for_branch(&self, branch_id: Uuid) -> AppResult<Vec<Service>> {
        sqlx::query_as::<_, Service>(
            "SELECT DISTINCT s.* FROM services s \
             JOIN branch_window_services bws ON bws.service_id = s.id AND bws.is_active = TRUE \
             JOIN branch_windows bw ON bw.id = bws.branch_window_id AND bw.is_active = TRUE \
             WHERE bw.branch_id = $1 AND s.is_active = TRUE \
             ORDER BY s.name ASC",
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list branch services", e)
        })
    }

    /// Whether the service is enabled on at least one active window of
    /// the branch.
    pub async fn branch_serves_service(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                SELECT 1 FROM branch_window_services bws \
                JOIN branch_windows bw ON bw.id = bws.branch_window_id AND bw.is_active = TRUE \
                WHERE bw.branch_id = $1 AND bws.service_id = $2 AND bws.is_active = TRUE \
             )",
        )
        .bind(branch_id)
        .bind(service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check service coverage", e)
        })
    }

    /// Service IDs attendable at the given branch window.
    pub async fn service_ids_for_window(&self, branch_window_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT service_id FROM branch_window_services \
             WHERE branch_window_id = $1 AND is_active = TRUE",
        )
        .bind(branch_window_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list window services", e)
        })
    }
}
