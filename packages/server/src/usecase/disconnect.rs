//! UseCase: tear down a connection.
//!
//! Runs for every exit path: clean close, transport error, and liveness
//! eviction. The cascade is idempotent, so a race between a socket-close
//! teardown and a liveness eviction resolves to a single cleanup.

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, RoomDirectory, TypingTracker};

pub struct DisconnectUseCase {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomDirectory>,
    typing: Arc<TypingTracker>,
    pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomDirectory>,
        typing: Arc<TypingTracker>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            rooms,
            typing,
            pusher,
        }
    }

    pub async fn execute(&self, connection_id: ConnectionId) {
        // remove() is the idempotency gate: the second caller finds
        // nothing and stops here.
        let Some(identity) = self.registry.remove(&connection_id).await else {
            return;
        };

        self.pusher.unregister(&connection_id).await;
        self.typing.clear_connection(&connection_id).await;
        let vacated = self.rooms.remove_connection(&connection_id).await;

        tracing::info!("Connection '{}' disconnected", connection_id);

        if let Some(identity) = identity {
            for (room, remaining) in vacated {
                if remaining.is_empty() {
                    continue;
                }
                let event = ServerEvent::UserLeft {
                    room,
                    user_id: identity.user_id.clone(),
                    display_name: identity.display_name.clone(),
                }
                .to_json();
                self.pusher.broadcast(&remaining, &event).await;
            }

            let users = self.registry.online_identities().await;
            let event = ServerEvent::ActiveUsers { users }.to_json();
            self.pusher.broadcast_all(&event).await;
        }
    }
}
