//! WebSocket endpoint.
//!
//! The token query parameter is optional: anonymous sockets may join
//! public rooms only, while a valid operator token unlocks private
//! rooms. A present but invalid token is rejected before the upgrade.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info};

use turnero_service::OperatorContext;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// GET /ws
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let identity = match query.token.as_deref() {
        Some(token) => {
            let claims = state.decoder.decode(token)?;
            Some(OperatorContext::from(claims))
        }
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(state, identity, socket)))
}

/// Runs one socket session: registers the connection, forwards queued
/// outbound frames, and routes inbound frames until the peer leaves.
async fn handle_socket(state: AppState, identity: Option<OperatorContext>, socket: WebSocket) {
    let (handle, mut outbound) = state.connections.register(identity);
    let conn_id = handle.id;
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(wire) = outbound.recv().await {
            if sink.send(Message::Text(wire.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                state.connections.handle_inbound(conn_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {
                // Binary and protocol frames carry nothing for us.
                debug!(conn_id = %conn_id, "Ignoring non-text frame");
            }
        }
    }

    writer.abort();
    state.connections.unregister(conn_id);
    info!(conn_id = %conn_id, "Socket session ended");
}
