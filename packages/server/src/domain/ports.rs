//! Ports: interfaces the engine consumes but does not implement itself.
//!
//! The usecase layer depends on these traits; the infrastructure layer
//! (or an external service client) provides the implementations.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[cfg(test)]
use mockall::automock;

use super::identity::Identity;
use super::ids::{ConnectionId, Emoji, MessageId, RoomId, UserId};
use super::message::{Message, NewMessage, Reaction};

/// Channel end the pusher writes serialized events into; the socket task
/// on the other side forwards them to the client.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Failure verifying a credential token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credential token")]
    InvalidToken,

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Identity/auth collaborator, consulted once per connection at
/// authenticate time.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Failure from the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("persistence service unavailable: {0}")]
    Unavailable(String),
}

/// Persistence collaborator. Every call is a possibly-failing remote
/// operation; callers must not hold any engine lock across the await.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Recent messages for a room, newest last, optionally paging
    /// backwards from `before`.
    async fn load_recent(
        &self,
        room: &RoomId,
        limit: usize,
        before: Option<MessageId>,
    ) -> Result<Vec<Message>, StoreError>;

    /// Persist a new message and return it with its assigned id.
    async fn save(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Replace a message's body and return the updated message.
    async fn update_content(
        &self,
        id: &MessageId,
        body: String,
        edited_at: i64,
    ) -> Result<Message, StoreError>;

    /// Tombstone a message.
    async fn mark_deleted(&self, id: &MessageId) -> Result<(), StoreError>;

    /// Toggle one (user, emoji) pair on a message and return the full
    /// reaction set afterwards. The pair appears at most once.
    async fn apply_reaction(
        &self,
        id: &MessageId,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<Vec<Reaction>, StoreError>;

    /// Advance the user's read cursor for a room, never backwards.
    /// Returns the effective cursor after the call.
    async fn mark_read(&self, room: &RoomId, user_id: &UserId, at: i64)
    -> Result<i64, StoreError>;

    /// Fetch one message by id, `None` if unknown.
    async fn load_message(&self, id: &MessageId) -> Result<Option<Message>, StoreError>;
}

/// Failure pushing an event to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Outbound delivery. Implementations own the connection → channel map;
/// broadcast tolerates members that vanished after the snapshot was taken.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel);

    async fn unregister(&self, connection_id: &ConnectionId);

    /// Deliver to a single connection; errors if it is unknown or its
    /// socket task has gone away.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Deliver to each target, skipping ones that are no longer
    /// registered. Partial failure is not an error.
    async fn broadcast(&self, targets: &[ConnectionId], content: &str);

    /// Deliver to every registered connection.
    async fn broadcast_all(&self, content: &str);
}
