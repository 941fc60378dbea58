//! WebSocket handling for chess clients.
//!
//! One connection per client. Inbound text frames decode into
//! [`ClientMessage`] and are dispatched to the [`Matchmaker`]; everything the
//! server says goes through the connection's bounded outbound channel.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use gambit_domain::ConnectionId;
use gambit_shared::{ClientMessage, ServerMessage};

use super::connections::ConnectionManager;
use crate::use_cases::Matchmaker;

/// Buffer size for per-connection message channels.
pub const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Shared state for WebSocket handlers.
pub struct WsState {
    pub matchmaker: Arc<Matchmaker>,
    pub connections: Arc<ConnectionManager>,
}

/// WebSocket upgrade handler - entry point for WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    state.connections.register(connection_id, tx);
    state.matchmaker.on_connect(connection_id).await;

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(connection_id = %connection_id, error = %e, "Failed to encode message");
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => handle_frame(&state, connection_id, text.as_str()).await,
            Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => handle_frame(&state, connection_id, text).await,
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Binary frame is not UTF-8");
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            // Ping/pong is answered by axum
            _ => {}
        }
    }

    // Forfeit before unregistering so the survivor is still reachable
    state.matchmaker.on_disconnect(connection_id).await;
    state.connections.unregister(connection_id);
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Decode one frame. Malformed frames are logged and dropped.
async fn handle_frame(state: &WsState, connection_id: ConnectionId, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => handle_message(msg, state, connection_id).await,
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
        }
    }
}

/// Dispatch a parsed client message.
async fn handle_message(msg: ClientMessage, state: &WsState, connection_id: ConnectionId) {
    match msg {
        ClientMessage::InitGame => {
            tracing::debug!(connection_id = %connection_id, "Match requested");
            state.matchmaker.on_match_request(connection_id).await;
        }
        ClientMessage::Move { request } => {
            tracing::debug!(connection_id = %connection_id, request = %request, "Move received");
            state.matchmaker.on_move(connection_id, request).await;
        }
        ClientMessage::Resign => {
            tracing::debug!(connection_id = %connection_id, "Resignation received");
            state.matchmaker.on_resign(connection_id).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod ws_integration_tests;
