//! In-memory implementation of the `MessageStore` port.
//!
//! Stand-in for the external persistence service so the binary and the
//! tests run without one. Same contract: reaction toggling and the
//! monotonic read cursor are the store's read-modify-write, not the
//! caller's.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Emoji, Message, MessageId, MessageStore, NewMessage, Reaction, RoomId, StoreError, UserId,
};

#[derive(Default)]
struct StoreInner {
    messages: HashMap<MessageId, Message>,
    /// Per-room insertion order, oldest first.
    room_order: HashMap<RoomId, Vec<MessageId>>,
    /// (room, user) → read cursor in epoch millis.
    read_cursors: HashMap<(RoomId, UserId), i64>,
}

/// Mutex-guarded in-memory message store.
#[derive(Default)]
pub struct InMemoryMessageStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn load_recent(
        &self,
        room: &RoomId,
        limit: usize,
        before: Option<MessageId>,
    ) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.lock().await;
        let Some(order) = inner.room_order.get(room) else {
            return Ok(Vec::new());
        };

        // Page backwards from `before` (exclusive), or from the tail.
        let end = match before {
            Some(before_id) => order
                .iter()
                .position(|id| *id == before_id)
                .ok_or(StoreError::NotFound)?,
            None => order.len(),
        };
        let start = end.saturating_sub(limit);
        let page = order[start..end]
            .iter()
            .filter_map(|id| inner.messages.get(id))
            .filter(|message| !message.deleted)
            .cloned()
            .collect();
        Ok(page)
    }

    async fn save(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = MessageId::new(Uuid::new_v4().to_string())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let saved = Message {
            id: id.clone(),
            room: message.room.clone(),
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            body: message.body.into_string(),
            sent_at: message.sent_at,
            edited_at: None,
            deleted: false,
            reactions: Vec::new(),
        };
        inner.messages.insert(id.clone(), saved.clone());
        inner.room_order.entry(message.room).or_default().push(id);
        Ok(saved)
    }

    async fn update_content(
        &self,
        id: &MessageId,
        body: String,
        edited_at: i64,
    ) -> Result<Message, StoreError> {
        let mut inner = self.inner.lock().await;
        let message = inner.messages.get_mut(id).ok_or(StoreError::NotFound)?;
        if message.deleted {
            return Err(StoreError::NotFound);
        }
        message.body = body;
        message.edited_at = Some(edited_at);
        Ok(message.clone())
    }

    async fn mark_deleted(&self, id: &MessageId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let message = inner.messages.get_mut(id).ok_or(StoreError::NotFound)?;
        message.deleted = true;
        Ok(())
    }

    async fn apply_reaction(
        &self,
        id: &MessageId,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<Vec<Reaction>, StoreError> {
        let mut inner = self.inner.lock().await;
        let message = inner.messages.get_mut(id).ok_or(StoreError::NotFound)?;
        if message.deleted {
            return Err(StoreError::NotFound);
        }

        // Toggle: remove the pair if present, insert it otherwise.
        let existing = message
            .reactions
            .iter()
            .position(|r| r.user_id == *user_id && r.emoji == *emoji);
        match existing {
            Some(index) => {
                message.reactions.remove(index);
            }
            None => {
                message.reactions.push(Reaction {
                    user_id: user_id.clone(),
                    emoji: emoji.clone(),
                });
            }
        }
        Ok(message.reactions.clone())
    }

    async fn mark_read(
        &self,
        room: &RoomId,
        user_id: &UserId,
        at: i64,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().await;
        let cursor = inner
            .read_cursors
            .entry((room.clone(), user_id.clone()))
            .or_insert(at);
        // Never regress: a slower device's older timestamp loses.
        *cursor = (*cursor).max(at);
        Ok(*cursor)
    }

    async fn load_message(&self, id: &MessageId) -> Result<Option<Message>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.get(id).cloned())
    }
}
