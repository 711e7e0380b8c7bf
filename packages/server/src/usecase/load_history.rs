//! UseCase: page older messages for one connection.
//!
//! History is a private reply: only the requesting connection receives
//! the page, and the requested limit is clamped to the configured
//! maximum so a client can never demand an unbounded page.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::{ConnectionId, MessageId, MessagePusher, MessageStore, RoomId, ServerEvent};

use super::error::EventError;

pub struct LoadHistoryUseCase {
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn MessagePusher>,
    config: EngineConfig,
}

impl LoadHistoryUseCase {
    pub fn new(
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn MessagePusher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            pusher,
            config,
        }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room: RoomId,
        before: Option<MessageId>,
        limit: Option<usize>,
    ) -> Result<(), EventError> {
        let page_size = limit
            .unwrap_or(self.config.history_page_limit)
            .min(self.config.history_page_limit);

        let messages = self.store.load_recent(&room, page_size, before).await?;

        let event = ServerEvent::RoomHistory { room, messages }.to_json();
        if let Err(error) = self.pusher.push_to(&connection_id, &event).await {
            tracing::warn!(
                "Failed to deliver history page to '{}': {}",
                connection_id,
                error
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, NewMessage, UserId};
    use crate::infrastructure::{InMemoryMessageStore, WebSocketMessagePusher};
    use tokio::sync::mpsc;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    async fn seed(store: &InMemoryMessageStore, count: usize) -> Vec<MessageId> {
        let mut ids = Vec::new();
        for i in 0..count {
            let saved = store
                .save(NewMessage {
                    room: room("general"),
                    sender_id: UserId::new("alice".to_string()).unwrap(),
                    sender_name: "alice".to_string(),
                    body: MessageBody::new(format!("message {i}")).unwrap(),
                    sent_at: 1_000 + i as i64,
                })
                .await
                .unwrap();
            ids.push(saved.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_history_page_goes_to_requester_only() {
        // Test item: the page is a private reply, not a broadcast
        // given:
        let store = Arc::new(InMemoryMessageStore::new());
        seed(&store, 3).await;
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let requester = ConnectionId::generate();
        let bystander = ConnectionId::generate();
        let (req_tx, mut req_rx) = mpsc::unbounded_channel();
        let (by_tx, mut by_rx) = mpsc::unbounded_channel();
        pusher.register(requester, req_tx).await;
        pusher.register(bystander, by_tx).await;
        let usecase = LoadHistoryUseCase::new(store, pusher, EngineConfig::default());

        // when:
        usecase
            .execute(requester, room("general"), None, None)
            .await
            .unwrap();

        // then:
        let event = req_rx.recv().await.unwrap();
        assert!(event.contains(r#""type":"room_history""#));
        assert!(event.contains("message 2"));
        assert!(by_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_requested_limit_is_clamped_to_configured_maximum() {
        // Test item: a greedy limit is cut down to the page cap
        // given: cap of 2, 5 stored messages, client asks for 100
        let store = Arc::new(InMemoryMessageStore::new());
        seed(&store, 5).await;
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let requester = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(requester, tx).await;
        let config = EngineConfig {
            history_page_limit: 2,
            ..EngineConfig::default()
        };
        let usecase = LoadHistoryUseCase::new(store, pusher, config);

        // when:
        usecase
            .execute(requester, room("general"), None, Some(100))
            .await
            .unwrap();

        // then: only the 2 newest messages
        let event = rx.recv().await.unwrap();
        assert!(event.contains("message 3"));
        assert!(event.contains("message 4"));
        assert!(!event.contains("message 2"));
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_not_found() {
        // Test item: paging before an unknown message id fails loudly
        // given: a room with history, and a cursor from nowhere
        let store = Arc::new(InMemoryMessageStore::new());
        seed(&store, 1).await;
        let usecase = LoadHistoryUseCase::new(
            store,
            Arc::new(WebSocketMessagePusher::new()),
            EngineConfig::default(),
        );

        // when:
        let result = usecase
            .execute(
                ConnectionId::generate(),
                room("general"),
                Some(MessageId::new("nope".to_string()).unwrap()),
                None,
            )
            .await;

        // then:
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }
}
