//! Display projection reads.
//!
//! Realtime payloads carry denormalized branch, service and window
//! names. The projection is re-read after each mutation so that the
//! emitted snapshot reflects committed state.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use turnero_core::error::{AppError, ErrorKind};
use turnero_core::events::TicketView;
use turnero_core::result::AppResult;
use turnero_entity::ticket::{TicketStatus, TicketType};

/// Joined row backing [`TicketView`].
#[derive(Debug, Clone, FromRow)]
struct DisplayRow {
    id: Uuid,
    code: String,
    package_code: Option<String>,
    #[sqlx(rename = "type")]
    ticket_type: TicketType,
    status: TicketStatus,
    branch_id: Uuid,
    branch_name: String,
    service_id: Uuid,
    service_name: String,
    service_code: String,
    window_id: Option<Uuid>,
    window_name: Option<String>,
    called_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<DisplayRow> for TicketView {
    fn from(row: DisplayRow) -> Self {
        TicketView {
            id: row.id,
            code: row.code,
            package_code: row.package_code,
            ticket_type: row.ticket_type.as_str().to_string(),
            status: row.status.as_str().to_string(),
            branch_id: row.branch_id,
            branch_name: row.branch_name,
            service_id: row.service_id,
            service_name: row.service_name,
            service_code: row.service_code,
            window_id: row.window_id,
            window_name: row.window_name,
            called_at: row.called_at,
            created_at: row.created_at,
        }
    }
}

const VIEW_SELECT: &str = "SELECT t.id, t.code, t.package_code, t.type, t.status, \
        t.branch_id, b.name AS branch_name, \
        t.service_id, s.name AS service_name, s.code AS service_code, \
        w.id AS window_id, w.name AS window_name, \
        t.called_at, t.created_at \
     FROM tickets t \
     JOIN branches b ON b.id = t.branch_id \
     JOIN services s ON s.id = t.service_id \
     LEFT JOIN branch_window_services bws ON bws.id = t.branch_window_service_id \
     LEFT JOIN branch_windows bw ON bw.id = bws.branch_window_id \
     LEFT JOIN windows w ON w.id = bw.window_id";

/// Read-only repository for display projections.
#[derive(Debug, Clone)]
pub struct DisplayRepository {
    pool: PgPool,
}

impl DisplayRepository {
    /// Create a new display repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The display projection of a single ticket.
    pub async fn view(&self, ticket_id: Uuid) -> AppResult<Option<TicketView>> {
        let row = sqlx::query_as::<_, DisplayRow>(&format!("{VIEW_SELECT} WHERE t.id = $1"))
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read ticket view", e)
            })?;
        Ok(row.map(TicketView::from))
    }

    /// Currently called tickets at a branch for the public display,
    /// newest call first, optionally filtered to a service set.
    pub async fn display_calls(
        &self,
        branch_id: Uuid,
        service_ids: Option<&[Uuid]>,
        limit: i64,
    ) -> AppResult<Vec<TicketView>> {
        let rows = sqlx::query_as::<_, DisplayRow>(&format!(
            "{VIEW_SELECT} \
             WHERE t.branch_id = $1 \
               AND t.status = 'LLAMADO' \
               AND ($2::uuid[] IS NULL OR t.service_id = ANY($2)) \
             ORDER BY t.called_at DESC NULLS LAST, t.created_at DESC \
             LIMIT $3"
        ))
        .bind(branch_id)
        .bind(service_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read display calls", e)
        })?;
        Ok(rows.into_iter().map(TicketView::from).collect())
    }
}
