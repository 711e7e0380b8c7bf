//! UseCase: edit a message.
//!
//! Only the original sender may edit. The updated message is fanned out
//! to every current member of its room, the editor included, so all of a
//! user's devices converge.

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{
    Identity, Message, MessageBody, MessageId, MessagePusher, MessageStore, ServerEvent,
};
use crate::infrastructure::RoomDirectory;

use super::error::EventError;

pub struct EditMessageUseCase {
    rooms: Arc<RoomDirectory>,
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl EditMessageUseCase {
    pub fn new(
        rooms: Arc<RoomDirectory>,
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            store,
            pusher,
            clock,
        }
    }

    pub async fn execute(
        &self,
        identity: &Identity,
        message_id: MessageId,
        body: MessageBody,
    ) -> Result<Message, EventError> {
        let existing = self
            .store
            .load_message(&message_id)
            .await?
            .filter(|message| !message.deleted)
            .ok_or_else(|| EventError::NotFound(format!("message '{message_id}' not found")))?;

        if existing.sender_id != identity.user_id {
            return Err(EventError::Unauthorized(
                "only the sender may edit a message".to_string(),
            ));
        }

        let updated = self
            .store
            .update_content(&message_id, body.into_string(), self.clock.now_millis())
            .await?;

        let targets = self.rooms.members(&updated.room).await;
        let event = ServerEvent::MessageEdited {
            message: updated.clone(),
        }
        .to_json();
        self.pusher.broadcast(&targets, &event).await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_shared::time::FixedClock;

    use crate::domain::{ConnectionId, NewMessage, Role, RoomId, UserId};
    use crate::infrastructure::{InMemoryMessageStore, WebSocketMessagePusher};
    use tokio::sync::mpsc;

    fn identity(user: &str) -> Identity {
        Identity::new(
            UserId::new(user.to_string()).unwrap(),
            user.to_string(),
            Role::Member,
        )
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn body(text: &str) -> MessageBody {
        MessageBody::new(text.to_string()).unwrap()
    }

    async fn saved_message(store: &InMemoryMessageStore, sender: &str) -> Message {
        store
            .save(NewMessage {
                room: room("general"),
                sender_id: UserId::new(sender.to_string()).unwrap(),
                sender_name: sender.to_string(),
                body: body("original"),
                sent_at: 1_000,
            })
            .await
            .unwrap()
    }

    fn fixture() -> (
        Arc<RoomDirectory>,
        Arc<InMemoryMessageStore>,
        Arc<WebSocketMessagePusher>,
        EditMessageUseCase,
    ) {
        let rooms = Arc::new(RoomDirectory::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = EditMessageUseCase::new(
            rooms.clone(),
            store.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(9_000)),
        );
        (rooms, store, pusher, usecase)
    }

    #[tokio::test]
    async fn test_sender_edits_and_room_hears_about_it() {
        // Test item: the owner's edit updates the store and reaches the
        // room's members
        // given:
        let (rooms, store, pusher, usecase) = fixture();
        let message = saved_message(&store, "alice").await;

        let observer = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(observer, tx).await;
        rooms.join(observer, room("general")).await;

        // when:
        let updated = usecase
            .execute(&identity("alice"), message.id.clone(), body("fixed"))
            .await
            .unwrap();

        // then:
        assert_eq!(updated.body, "fixed");
        assert_eq!(updated.edited_at, Some(9_000));
        let event = rx.recv().await.unwrap();
        assert!(event.contains(r#""type":"message_edited""#));
        assert!(event.contains("fixed"));
    }

    #[tokio::test]
    async fn test_non_owner_edit_is_unauthorized() {
        // Test item: editing someone else's message is rejected and the
        // body stays untouched
        // given:
        let (_rooms, store, _pusher, usecase) = fixture();
        let message = saved_message(&store, "alice").await;

        // when:
        let result = usecase
            .execute(&identity("bob"), message.id.clone(), body("hijack"))
            .await;

        // then:
        assert!(matches!(result, Err(EventError::Unauthorized(_))));
        let unchanged = store.load_message(&message.id).await.unwrap().unwrap();
        assert_eq!(unchanged.body, "original");
    }

    #[tokio::test]
    async fn test_edit_of_unknown_message_is_not_found() {
        // Test item: an unknown message id is reported, not panicked on
        // given:
        let (_rooms, _store, _pusher, usecase) = fixture();

        // when:
        let result = usecase
            .execute(
                &identity("alice"),
                MessageId::new("missing".into()).unwrap(),
                body("x"),
            )
            .await;

        // then:
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }
}
