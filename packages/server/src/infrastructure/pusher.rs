//! WebSocket-backed implementation of the `MessagePusher` port.
//!
//! Owns the connection → sender map. Socket creation happens in the UI
//! layer; this type only holds the channel ends and writes into them.
//! Senders are cloned out under the lock and the actual sends happen
//! after it is released, so one slow fan-out never serializes the rest
//! of the engine.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// Connection → outbound channel map behind the `MessagePusher` port.
#[derive(Default)]
pub struct WebSocketMessagePusher {
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the senders for the requested targets; unknown targets
    /// are silently dropped from the result.
    async fn senders_for(&self, targets: &[ConnectionId]) -> Vec<(ConnectionId, PusherChannel)> {
        let clients = self.clients.lock().await;
        targets
            .iter()
            .filter_map(|id| clients.get(id).map(|sender| (*id, sender.clone())))
            .collect()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let sender = {
            let clients = self.clients.lock().await;
            clients.get(connection_id).cloned()
        };

        match sender {
            Some(sender) => {
                sender
                    .send(content.to_string())
                    .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
                tracing::debug!("Pushed message to connection '{}'", connection_id);
                Ok(())
            }
            None => Err(MessagePushError::ConnectionNotFound(
                connection_id.to_string(),
            )),
        }
    }

    async fn broadcast(&self, targets: &[ConnectionId], content: &str) {
        let senders = self.senders_for(targets).await;

        // Lock released; per-connection sends are independent now.
        for (id, sender) in senders {
            if let Err(e) = sender.send(content.to_string()) {
                // The member disconnected mid-broadcast; skip it.
                tracing::warn!("Failed to push message to connection '{}': {}", id, e);
            } else {
                tracing::debug!("Broadcasted message to connection '{}'", id);
            }
        }
    }

    async fn broadcast_all(&self, content: &str) {
        let senders: Vec<(ConnectionId, PusherChannel)> = {
            let clients = self.clients.lock().await;
            clients
                .iter()
                .map(|(id, sender)| (*id, sender.clone()))
                .collect()
        };

        for (id, sender) in senders {
            if let Err(e) = sender.send(content.to_string()) {
                tracing::warn!("Failed to push message to connection '{}': {}", id, e);
            }
        }
    }
}
