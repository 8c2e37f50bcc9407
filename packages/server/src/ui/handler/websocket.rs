//! WebSocket connection handlers.
//!
//! Each socket is split into a writer task, fed by the connection's
//! [`OutboundFrame`] channel, and a reader task that dispatches inbound
//! frames to the use cases. When either side finishes the other is aborted
//! and the participant is disconnected.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{Connection, ConnectionId},
    infrastructure::connection::{OutboundFrame, WebSocketConnection},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the outbound channel into the WebSocket sink.
///
/// # Arguments
///
/// * `rx` - Frames queued by [`WebSocketConnection`]
/// * `sender` - WebSocket sink of this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                OutboundFrame::Text(text) => Message::Text(text.into()),
                OutboundFrame::Ping => Message::Ping(Bytes::new()),
                OutboundFrame::Close { code, reason } => {
                    let close = Message::Close(Some(CloseFrame {
                        code,
                        reason: reason.into(),
                    }));
                    let _ = sender.send(close).await;
                    break;
                }
                OutboundFrame::Terminate => break,
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = Arc::new(WebSocketConnection::new(ConnectionId::next(), tx));
    let connection_id = connection.id();

    // Start the writer first so the welcome message is flushed right away
    let mut send_task = pusher_loop(rx, sender);

    let participant = state
        .connect_participant_usecase
        .execute(connection.clone())
        .await;
    tracing::info!(
        "Participant '{}' ({}) connected on {}",
        participant.id,
        participant.display_name,
        connection_id
    );

    let state_clone = state.clone();
    let connection_clone = connection.clone();

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    // Transport errors are logged; the stream ends on its own
                    // if the socket is really gone.
                    tracing::error!("WebSocket error on {}: {}", connection_id, e);
                    continue;
                }
            };

            match msg {
                Message::Text(text) => {
                    relay(&state_clone, connection_clone.as_ref(), text.as_str()).await;
                }
                Message::Binary(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    relay(&state_clone, connection_clone.as_ref(), &text).await;
                }
                Message::Pong(_) => {
                    tracing::debug!("Received pong on {}", connection_id);
                    state_clone
                        .monitor_liveness_usecase
                        .acknowledge(connection_id)
                        .await;
                }
                Message::Ping(_) => {
                    // Answered automatically by the WebSocket protocol
                    tracing::debug!("Received ping on {}", connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Client on {} requested close", connection_id);
                    break;
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    connection.mark_closed();

    // Already removed by eviction or a forced disconnect: nothing to announce
    if state
        .disconnect_participant_usecase
        .execute(connection_id)
        .await
        .is_none()
    {
        tracing::debug!("{} was already removed from the registry", connection_id);
    }
}

async fn relay(state: &AppState, connection: &WebSocketConnection, raw: &str) {
    tracing::debug!("Received text on {}: {}", connection.id(), raw);
    if let Err(e) = state
        .relay_message_usecase
        .execute(connection.id(), raw)
        .await
    {
        tracing::warn!("Failed to relay message from {}: {}", connection.id(), e);
        state.relay_message_usecase.report_failure(connection, &e);
    }
}
