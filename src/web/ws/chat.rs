//! Chat WebSocket handler.
//!
//! Each socket gets a receive loop running in the upgrade task and a
//! writer task that owns the sink. Only the relay feeds the writer.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::chat::{Connection, ConnectionId};
use crate::web::handlers::AppState;

/// WebSocket chat handler.
///
/// GET /ws
pub async fn chat_ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection, mut outbound) = Connection::new(state.connection_buffer);
    let id = connection.id();
    state.registry.register(connection).await;
    tracing::debug!(connection = %id, "WebSocket session started");

    // Split the socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Ends when the relay drops this connection or the socket fails
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if ws_sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                        Ok(text) => text,
                        Err(e) => {
                            let result = state.dispatcher.reject_frame(id, &e.to_string()).await;
                            if !keep_open(id, result) {
                                break;
                            }
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(connection = %id, "WebSocket closed by client");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(connection = %id, error = %e, "WebSocket error");
                        break;
                    }
                };

                if !handle_text(&state, id, &text).await {
                    break;
                }
            }

            _ = &mut writer => {
                tracing::debug!(connection = %id, "WebSocket writer stopped");
                break;
            }
        }
    }

    // Membership is kept; the user can come back with its token
    state.registry.unregister(id).await;
    writer.abort();
    tracing::debug!(connection = %id, "WebSocket session ended");
}

/// Dispatch one text frame. Returns false if the session must end.
async fn handle_text(state: &AppState, id: ConnectionId, text: &str) -> bool {
    keep_open(id, state.dispatcher.handle_frame(id, text).await)
}

fn keep_open(id: ConnectionId, result: crate::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(connection = %id, error = %e, "Dispatch failed");
            false
        }
    }
}
