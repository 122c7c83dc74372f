//! Operator queue endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Serialize;
use uuid::Uuid;

use turnero_core::events::TicketView;
use turnero_service::QueueSnapshot;

use crate::dto::{ApiResponse, CallNextRequest, QueueQuery};
use crate::error::ApiResult;
use crate::extractors::AuthOperator;
use crate::state::AppState;

/// Response for call-next: `ticket` is null when the queue is empty.
#[derive(Debug, Serialize)]
pub struct CallNextResponse {
    pub ticket: Option<TicketView>,
}

/// POST /api/queue/call-next
pub async fn call_next(
    State(state): State<AppState>,
    AuthOperator(ctx): AuthOperator,
    Json(request): Json<CallNextRequest>,
) -> ApiResult<Json<ApiResponse<CallNextResponse>>> {
    let ticket = state
        .queue
        .call_next(&ctx, request.branch_id, request.service_id)
        .await?;
    Ok(Json(ApiResponse::ok(CallNextResponse { ticket })))
}

/// PATCH /api/queue/{ticket_id}/recall
pub async fn recall(
    State(state): State<AppState>,
    AuthOperator(ctx): AuthOperator,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TicketView>>> {
    let view = state.queue.recall(&ctx, ticket_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PATCH /api/queue/{ticket_id}/start
pub async fn start(
    State(state): State<AppState>,
    AuthOperator(ctx): AuthOperator,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TicketView>>> {
    let view = state.queue.start(&ctx, ticket_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PATCH /api/queue/{ticket_id}/hold
pub async fn hold(
    State(state): State<AppState>,
    AuthOperator(ctx): AuthOperator,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TicketView>>> {
    let view = state.queue.hold(&ctx, ticket_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PATCH /api/queue/{ticket_id}/finish
pub async fn finish(
    State(state): State<AppState>,
    AuthOperator(ctx): AuthOperator,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TicketView>>> {
    let view = state.queue.finish(&ctx, ticket_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PATCH /api/queue/{ticket_id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    AuthOperator(ctx): AuthOperator,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TicketView>>> {
    let view = state.queue.cancel(&ctx, ticket_id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/queue
pub async fn snapshot(
    State(state): State<AppState>,
    AuthOperator(ctx): AuthOperator,
    Query(query): Query<QueueQuery>,
) -> ApiResult<Json<ApiResponse<QueueSnapshot>>> {
    let snapshot = state
        .queue
        .snapshot(&ctx, query.branch_id, query.service_id)
        .await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}
