//! Message and reaction entities.
//!
//! The persistence collaborator owns message content; the engine only
//! needs the identity, room, and sender fields to route and authorize.

use serde::{Deserialize, Serialize};

use super::ids::{Emoji, MessageBody, MessageId, RoomId, UserId};

/// One (user, emoji) reaction. A given pair appears at most once per
/// message; applying it again removes it (toggle semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub user_id: UserId,
    pub emoji: Emoji,
}

/// A persisted chat message as the store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub room: RoomId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub body: String,
    pub sent_at: i64,
    pub edited_at: Option<i64>,
    pub deleted: bool,
    pub reactions: Vec<Reaction>,
}

/// Payload handed to the store when a message is first saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room: RoomId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub body: MessageBody,
    pub sent_at: i64,
}
