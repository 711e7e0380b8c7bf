//! UseCase: toggle an emoji reaction on a message.
//!
//! The toggle is idempotent in pairs: the same user reacting with the
//! same emoji twice lands back where they started, and every toggle
//! broadcasts the full replacement reaction list so clients never have
//! to merge deltas.

use std::sync::Arc;

use crate::domain::{Emoji, Identity, MessageId, MessagePusher, MessageStore, ServerEvent};
use crate::infrastructure::RoomDirectory;

use super::error::EventError;

pub struct ToggleReactionUseCase {
    rooms: Arc<RoomDirectory>,
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn MessagePusher>,
}

impl ToggleReactionUseCase {
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
        emoji: Emoji,
    ) -> Result<(), EventError> {
        let message = self
            .store
            .load_message(&message_id)
            .await?
            .filter(|m| !m.deleted)
            .ok_or(EventError::NotFound("message not found".to_string()))?;

        let reactions = self
            .store
            .apply_reaction(&message_id, &identity.user_id, &emoji)
            .await?;

        tracing::info!(
            "User '{}' toggled '{}' on message '{}'",
            identity.user_id,
            emoji,
            message_id
        );

        let targets = self.rooms.members(&message.room).await;
        let event = ServerEvent::ReactionUpdated {
            room: message.room,
            message_id,
            reactions,
        }
        .to_json();
        self.pusher.broadcast(&targets, &event).await;

        Ok(())
    }
}
