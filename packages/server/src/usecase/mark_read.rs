//! UseCase: advance a user's read cursor in a room.
//!
//! The cursor is monotonic: the store keeps the max of the stored and
//! the new timestamp, so a delayed or replayed mark-read can never move
//! it backwards. Every call broadcasts the effective cursor, which makes
//! the operation safe to repeat.

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{Identity, MessagePusher, MessageStore, RoomId, ServerEvent};
use crate::infrastructure::RoomDirectory;

use super::error::EventError;

pub struct MarkReadUseCase {
    rooms: Arc<RoomDirectory>,
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl MarkReadUseCase {
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

    pub async fn execute(&self, identity: &Identity, room: RoomId) -> Result<(), EventError> {
        let read_at = self
            .store
            .mark_read(&room, &identity.user_id, self.clock.now_millis())
            .await?;

        let targets = self.rooms.members(&room).await;
        let event = ServerEvent::MessagesRead {
            room,
            user_id: identity.user_id.clone(),
            read_at,
        }
        .to_json();
        self.pusher.broadcast(&targets, &event).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_shared::time::FixedClock;

    use crate::domain::{ConnectionId, Role, UserId};
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

    #[tokio::test]
    async fn test_mark_read_broadcasts_cursor_to_room() {
        // Test item: marking read announces the new cursor to members
        // given:
        let rooms = Arc::new(RoomDirectory::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let conn = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(conn, tx).await;
        rooms.join(conn, room("general")).await;
        let usecase = MarkReadUseCase::new(
            rooms,
            Arc::new(InMemoryMessageStore::new()),
            pusher,
            Arc::new(FixedClock::new(7_500)),
        );

        // when:
        usecase.execute(&identity("alice"), room("general")).await.unwrap();

        // then:
        let event = rx.recv().await.unwrap();
        assert!(event.contains(r#""type":"messages_read""#));
        assert!(event.contains(r#""read_at":7500"#));
    }

    #[tokio::test]
    async fn test_stale_mark_read_keeps_monotonic_cursor() {
        // Test item: a mark-read carrying an older clock reading never
        // moves the cursor back; the broadcast carries the max
        // given: cursor already at t=10s
        let store = Arc::new(InMemoryMessageStore::new());
        let rooms = Arc::new(RoomDirectory::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let conn = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(conn, tx).await;
        rooms.join(conn, room("general")).await;
        let forward = MarkReadUseCase::new(
            rooms.clone(),
            store.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(10_000)),
        );
        forward.execute(&identity("alice"), room("general")).await.unwrap();
        let _ = rx.recv().await;

        // when: a second call with an earlier timestamp
        let stale = MarkReadUseCase::new(rooms, store, pusher, Arc::new(FixedClock::new(4_000)));
        stale.execute(&identity("alice"), room("general")).await.unwrap();

        // then:
        let event = rx.recv().await.unwrap();
        assert!(event.contains(r#""read_at":10000"#));
    }
}
