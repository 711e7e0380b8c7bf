//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{domain::ConnectionId, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the connection's outbound channel into the
/// WebSocket sink. Ends when the channel closes or the sink errors.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Admit the connection: registry entry for liveness tracking, pusher
    // channel for outbound delivery. Identity arrives later over the wire.
    let connection_id = state.registry.register(state.clock.now_millis()).await;
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register(connection_id, tx).await;
    tracing::info!("Connection '{}' established", connection_id);

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    recv_state.dispatcher.handle_text(connection_id, &text).await;
                }
                // Transport-level pings are answered by axum; they still
                // prove the peer is alive.
                Message::Ping(_) | Message::Pong(_) => {
                    touch(&recv_state, &connection_id).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Same cascade the liveness monitor runs; whichever gets there first
    // wins and the other is a no-op.
    state.disconnect.execute(connection_id).await;
}

async fn touch(state: &Arc<AppState>, connection_id: &ConnectionId) {
    state
        .registry
        .touch(connection_id, state.clock.now_millis())
        .await;
}
