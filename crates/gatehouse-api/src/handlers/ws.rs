//! Dashboard WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use chrono::{Duration, Utc};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use gatehouse_core::types::id::ConnectionId;

use crate::state::AppState;

/// GET /ws — dashboard subscriber upgrade.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_connection(state, socket))
}

/// Drives one dashboard connection: registers it, forwards queued cards
/// out, and treats every inbound frame as a heartbeat.
async fn handle_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let conn_id = ConnectionId::new();
    let ttl = Duration::seconds(state.config.realtime.connection_ttl_seconds as i64);
    let (tx, mut outbound_rx) = mpsc::channel::<String>(state.config.realtime.channel_buffer_size);

    state.registry.add(conn_id, tx, Utc::now(), ttl);
    info!(conn_id = %conn_id, "Dashboard connection established");

    // Forward queued card payloads into the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(_)) | Ok(Message::Pong(_)) => {
                state.registry.touch(conn_id, Utc::now(), ttl);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.registry.remove(conn_id);
    info!(conn_id = %conn_id, "Dashboard connection closed");
}
