//! Operator window assignment and window-service binding lookups.

use sqlx::PgPool;
use uuid::Uuid;

use turnero_core::error::{AppError, ErrorKind};
use turnero_core::result::AppResult;
use turnero_entity::assignment::{OperatorWindowAssignment, WindowServiceBinding};

/// Repository for the authorization-relevant assignment tables.
#[derive(Debug, Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Create a new assignment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The operator's active window assignment at a branch, if any.
    /// A partial unique index guarantees at most one active row per
    /// (operator, branch).
    pub async fn active_assignment(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
    ) -> AppResult<Option<OperatorWindowAssignment>> {
        sqlx::query_as::<_, OperatorWindowAssignment>(
            "SELECT * FROM operator_branch_windows \
             WHERE operator_id = $1 AND branch_id = $2 AND is_active = TRUE",
        )
        .bind(operator_id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find window assignment", e)
        })
    }

    /// All active window assignments for an operator, across branches.
    pub async fn assignments_for_operator(
        &self,
        operator_id: Uuid,
    ) -> AppResult<Vec<OperatorWindowAssignment>> {
        sqlx::query_as::<_, OperatorWindowAssignment>(
            "SELECT * FROM operator_branch_windows \
             WHERE operator_id = $1 AND is_active = TRUE",
        )
        .bind(operator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list window assignments", e)
        })
    }

    /// The active binding between a branch window and a service, if any.
    pub async fn binding_for(
        &self,
        branch_window_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<WindowServiceBinding>> {
        sqlx::query_as::<_, WindowServiceBinding>(
            "SELECT * FROM branch_window_services \
             WHERE branch_window_id = $1 AND service_id = $2 AND is_active = TRUE",
        )
        .bind(branch_window_id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find service binding", e)
        })
    }
}
