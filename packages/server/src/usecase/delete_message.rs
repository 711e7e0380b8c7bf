//! UseCase: delete (tombstone) a message.
//!
//! Only the original sender may delete. Remaining room members receive a
//! `message_deleted` event carrying the room and message id.

use std::sync::Arc;

use crate::domain::{Identity, MessageId, MessagePusher, MessageStore, ServerEvent};
use crate::infrastructure::RoomDirectory;

use super::error::EventError;

pub struct DeleteMessageUseCase {
    rooms: Arc<RoomDirectory>,
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn MessagePusher>,
}

impl DeleteMessageUseCase {
    pub fn new(
        rooms: Arc<RoomDirectory>,
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            rooms,
            store,
            pusher,
        }
    }

    pub async fn execute(
        &self,
        identity: &Identity,
        message_id: MessageId,
    ) -> Result<(), EventError> {
        let existing = self
            .store
            .load_message(&message_id)
            .await?
            .filter(|message| !message.deleted)
            .ok_or_else(|| EventError::NotFound(format!("message '{message_id}' not found")))?;

        if existing.sender_id != identity.user_id {
            return Err(EventError::Unauthorized(
                "only the sender may delete a message".to_string(),
            ));
        }

        self.store.mark_deleted(&message_id).await?;

        let targets = self.rooms.members(&existing.room).await;
        let event = ServerEvent::MessageDeleted {
            room: existing.room.clone(),
            message_id,
        }
        .to_json();
        self.pusher.broadcast(&targets, &event).await;

        Ok(())
    }
}
