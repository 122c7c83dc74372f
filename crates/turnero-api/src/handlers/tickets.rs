//! Ticket issuance endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use turnero_core::AppError;
use turnero_entity::Ticket;

use crate::dto::{ApiResponse, CreateTicketRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/tickets
///
/// Unauthenticated: kiosks and the public issuance page create tickets
/// without credentials.
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(request): Json<CreateTicketRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Ticket>>)> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let ticket = state
        .issuance
        .issue(
            request.ticket_type,
            request.branch_id,
            request.service_id,
            request.package_code,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(ticket))))
}
