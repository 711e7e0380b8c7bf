//! UseCase: join a room.
//!
//! Membership commits first, then history is fetched from the store with
//! no engine lock held, then the "user joined" fan-out goes to the other
//! members. A repeat join is idempotent and does not re-announce.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::{ConnectionId, Identity, MessagePusher, MessageStore, RoomId, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, RoomDirectory};

use super::error::EventError;

pub struct JoinRoomUseCase {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomDirectory>,
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn MessagePusher>,
    config: EngineConfig,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomDirectory>,
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn MessagePusher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            rooms,
            store,
            pusher,
            config,
        }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        room: RoomId,
    ) -> Result<(), EventError> {
        // 1. Commit membership (set semantics) and mark the active room.
        let newly = self.rooms.join(connection_id, room.clone()).await;
        self.registry
            .set_active_room(&connection_id, Some(room.clone()))
            .await;

        // 2. Serve recent history. The fetch is collaborator I/O; a
        //    failure aborts only this operation, membership stands.
        let messages = self
            .store
            .load_recent(&room, self.config.history_page_limit, None)
            .await?;
        let history = ServerEvent::RoomHistory {
            room: room.clone(),
            messages,
        }
        .to_json();
        if let Err(e) = self.pusher.push_to(&connection_id, &history).await {
            tracing::warn!("Failed to send room history to '{}': {}", connection_id, e);
        }

        // 3. Announce to the other members, first join only.
        if newly {
            let mut targets = self.rooms.members(&room).await;
            targets.retain(|id| id != &connection_id);
            let joined = ServerEvent::UserJoined {
                room: room.clone(),
                user_id: identity.user_id.clone(),
                display_name: identity.display_name.clone(),
            }
            .to_json();
            self.pusher.broadcast(&targets, &joined).await;
            tracing::info!("'{}' joined room '{}'", identity.user_id, room);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, NewMessage, Role, UserId};
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

    struct Fixture {
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomDirectory>,
        store: Arc<InMemoryMessageStore>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: JoinRoomUseCase,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomDirectory::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = JoinRoomUseCase::new(
            registry.clone(),
            rooms.clone(),
            store.clone(),
            pusher.clone(),
            EngineConfig::default(),
        );
        Fixture {
            registry,
            rooms,
            store,
            pusher,
            usecase,
        }
    }

    async fn connect(f: &Fixture) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let conn = f.registry.register(1_000).await;
        let (tx, rx) = mpsc::unbounded_channel();
        f.pusher.register(conn, tx).await;
        (conn, rx)
    }

    #[tokio::test]
    async fn test_join_serves_history_and_announces_to_others() {
        // Test item: the joiner gets history; existing members get the
        // user_joined event; the joiner does not hear its own join
        // given:
        let f = fixture();
        let (resident, mut resident_rx) = connect(&f).await;
        let (joiner, mut joiner_rx) = connect(&f).await;
        f.rooms.join(resident, room("general")).await;
        f.store
            .save(NewMessage {
                room: room("general"),
                sender_id: UserId::new("bob".into()).unwrap(),
                sender_name: "bob".into(),
                body: MessageBody::new("earlier".into()).unwrap(),
                sent_at: 900,
            })
            .await
            .unwrap();

        // when:
        f.usecase
            .execute(joiner, &identity("alice"), room("general"))
            .await
            .unwrap();

        // then:
        let history = joiner_rx.recv().await.unwrap();
        assert!(history.contains(r#""type":"room_history""#));
        assert!(history.contains("earlier"));
        assert!(joiner_rx.try_recv().is_err(), "no self user_joined echo");

        let joined = resident_rx.recv().await.unwrap();
        assert!(joined.contains(r#""type":"user_joined""#));
        assert!(joined.contains("alice"));
    }

    #[tokio::test]
    async fn test_repeat_join_is_idempotent_and_silent_to_others() {
        // Test item: joining the same room again re-serves history but
        // does not re-announce
        // given:
        let f = fixture();
        let (resident, mut resident_rx) = connect(&f).await;
        let (joiner, mut joiner_rx) = connect(&f).await;
        f.rooms.join(resident, room("general")).await;
        f.usecase
            .execute(joiner, &identity("alice"), room("general"))
            .await
            .unwrap();
        let _ = resident_rx.recv().await; // the first user_joined
        let _ = joiner_rx.recv().await; // the first history

        // when:
        f.usecase
            .execute(joiner, &identity("alice"), room("general"))
            .await
            .unwrap();

        // then: history again, but no second announcement
        let history = joiner_rx.recv().await.unwrap();
        assert!(history.contains(r#""type":"room_history""#));
        assert!(resident_rx.try_recv().is_err());
        assert_eq!(f.rooms.members(&room("general")).await.len(), 2);
    }

    #[tokio::test]
    async fn test_join_marks_active_room() {
        // Test item: joining records the connection's active room
        // given:
        let f = fixture();
        let (joiner, _joiner_rx) = connect(&f).await;

        // when:
        f.usecase
            .execute(joiner, &identity("alice"), room("general"))
            .await
            .unwrap();

        // then:
        assert_eq!(
            f.registry.active_room_of(&joiner).await,
            Some(room("general"))
        );
    }
}
