//! UseCase: send a chat message.
//!
//! Requires room membership. The save is collaborator I/O and runs with
//! no engine lock held; only after it succeeds is the message fanned out
//! to the other members (the sender renders locally and gets no echo).
//! Sending implicitly clears the sender's typing indicator for the room.

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{
    ConnectionId, Identity, Message, MessageBody, MessagePusher, MessageStore, NewMessage, RoomId,
    ServerEvent,
};
use crate::infrastructure::{RoomDirectory, TypingTracker};

use super::error::EventError;

pub struct SendMessageUseCase {
    rooms: Arc<RoomDirectory>,
    typing: Arc<TypingTracker>,
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        rooms: Arc<RoomDirectory>,
        typing: Arc<TypingTracker>,
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            typing,
            store,
            pusher,
            clock,
        }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        room: RoomId,
        body: MessageBody,
    ) -> Result<Message, EventError> {
        // 1. Only members may post.
        if !self.rooms.is_member(&connection_id, &room).await {
            return Err(EventError::NotFound(format!(
                "not a member of room '{room}'"
            )));
        }

        // 2. A message send always resets the sender to "not typing".
        self.typing.clear(&room, &connection_id).await;

        // 3. Persist through the collaborator.
        let message = self
            .store
            .save(NewMessage {
                room: room.clone(),
                sender_id: identity.user_id.clone(),
                sender_name: identity.display_name.clone(),
                body,
                sent_at: self.clock.now_millis(),
            })
            .await?;

        // 4. Fan out to everyone else in the room. Membership is
        //    snapshotted here; members that disconnect during delivery
        //    are skipped by the pusher.
        let mut targets = self.rooms.members(&room).await;
        targets.retain(|id| id != &connection_id);
        let event = ServerEvent::NewMessage {
            message: message.clone(),
        }
        .to_json();
        self.pusher.broadcast(&targets, &event).await;

        tracing::debug!(
            "Message '{}' from '{}' fanned out to {} members of '{}'",
            message.id,
            identity.user_id,
            targets.len(),
            room
        );
        Ok(message)
    }
}
