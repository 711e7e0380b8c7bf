//! UseCase: leave a room.
//!
//! Clears any typing indicator the connection held in that room, drops
//! the membership (the directory garbage-collects empty rooms), and
//! announces to whoever remains. Leaving a room never joined is a no-op.

use std::sync::Arc;

use crate::domain::{ConnectionId, Identity, MessagePusher, RoomId, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, RoomDirectory, TypingTracker};

use super::error::EventError;

pub struct LeaveRoomUseCase {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomDirectory>,
    typing: Arc<TypingTracker>,
    pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
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

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        room: RoomId,
    ) -> Result<(), EventError> {
        self.typing.clear(&room, &connection_id).await;

        let outcome = self.rooms.leave(&connection_id, &room).await;
        if self.registry.active_room_of(&connection_id).await.as_ref() == Some(&room) {
            self.registry.set_active_room(&connection_id, None).await;
        }

        if outcome.removed && !outcome.remaining.is_empty() {
            let left = ServerEvent::UserLeft {
                room: room.clone(),
                user_id: identity.user_id.clone(),
                display_name: identity.display_name.clone(),
            }
            .to_json();
            self.pusher.broadcast(&outcome.remaining, &left).await;
            tracing::info!("'{}' left room '{}'", identity.user_id, room);
        }

        Ok(())
    }
}
