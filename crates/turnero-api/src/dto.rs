//! Request and response payloads for the HTTP surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use turnero_core::{AppError, AppResult};
use turnero_entity::TicketType;

/// Body for `POST /api/tickets`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    /// Queue discipline for the new ticket.
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub branch_id: Uuid,
    pub service_id: Uuid,
    /// Optional courier package reference printed on the stub.
    #[validate(length(max = 25, message = "Package code must be at most 25 characters"))]
    pub package_code: Option<String>,
}

/// Body for `POST /api/queue/call-next`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallNextRequest {
    pub branch_id: Uuid,
    pub service_id: Uuid,
}

/// Query parameters for `GET /api/queue`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueQuery {
    pub branch_id: Uuid,
    pub service_id: Uuid,
}

/// Query parameters for `GET /api/public/display-calls`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayCallsQuery {
    pub branch_id: Uuid,
    /// Comma-separated service IDs; absent means all services.
    pub service_ids: Option<String>,
    pub limit: Option<i64>,
}

impl DisplayCallsQuery {
    /// Parses the comma-separated filter into UUIDs, rejecting malformed
    /// entries instead of silently dropping them.
    pub fn parsed_service_ids(&self) -> AppResult<Option<Vec<Uuid>>> {
        let Some(raw) = self.service_ids.as_deref() else {
            return Ok(None);
        };
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|_| AppError::validation(format!("Invalid service ID: {s}")))
            })
            .collect::<AppResult<Vec<Uuid>>>()?;
        Ok(if ids.is_empty() { None } else { Some(ids) })
    }
}

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Liveness payload for `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
