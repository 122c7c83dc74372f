//! Unauthenticated catalog and display endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use turnero_core::events::TicketView;
use turnero_entity::{Branch, Service};

use crate::dto::{ApiResponse, DisplayCallsQuery};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/public/branches
pub async fn list_branches(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Branch>>>> {
    let branches = state.catalog.active_branches().await?;
    Ok(Json(ApiResponse::ok(branches)))
}

/// GET /api/public/branches/{branch_id}/services
pub async fn list_branch_services(
    State(state): State<AppState>,
    Path(branch_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<Service>>>> {
    let services = state.catalog.services_for_branch(branch_id).await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// GET /api/public/display-calls
///
/// Recently called tickets for a branch display board, newest first.
/// Package codes are stripped; the board sees only the public subset.
pub async fn display_calls(
    State(state): State<AppState>,
    Query(query): Query<DisplayCallsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<TicketView>>>> {
    let service_ids = query.parsed_service_ids()?;
    let cap = state.config.queue.display_calls_limit;
    let limit = query.limit.unwrap_or(cap).clamp(1, cap);

    let calls = state
        .display
        .display_calls(query.branch_id, service_ids.as_deref(), limit)
        .await?;
    let calls = calls.iter().map(TicketView::public_subset).collect();
    Ok(Json(ApiResponse::ok(calls)))
}
