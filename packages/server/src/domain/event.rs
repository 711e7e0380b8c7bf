//! Wire contract: tagged client and server event types.
//!
//! Inbound events carry raw strings; the dispatcher converts them to
//! validated value objects before any handler runs. Outbound events carry
//! domain types directly, which serialize as plain strings.

use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::ids::{MessageId, RoomId, UserId};
use super::message::{Message, Reaction};

/// Client-to-server events, dispatched on the `type` tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Authenticate {
        token: String,
    },
    JoinRoom {
        room: String,
    },
    LeaveRoom {
        room: String,
    },
    SendMessage {
        room: String,
        content: String,
    },
    EditMessage {
        message_id: String,
        content: String,
    },
    DeleteMessage {
        message_id: String,
    },
    Typing {
        room: String,
        is_typing: bool,
    },
    AddReaction {
        message_id: String,
        emoji: String,
    },
    MarkAsRead {
        room: String,
    },
    LoadMoreMessages {
        room: String,
        #[serde(default)]
        before: Option<String>,
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Reply to a liveness probe.
    Pong,
}

/// Server-to-client events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Authenticated {
        identity: Identity,
    },
    RoomHistory {
        room: RoomId,
        messages: Vec<Message>,
    },
    NewMessage {
        message: Message,
    },
    MessageEdited {
        message: Message,
    },
    MessageDeleted {
        room: RoomId,
        message_id: MessageId,
    },
    UserTyping {
        room: RoomId,
        user_id: UserId,
        display_name: String,
        is_typing: bool,
    },
    UserJoined {
        room: RoomId,
        user_id: UserId,
        display_name: String,
    },
    UserLeft {
        room: RoomId,
        user_id: UserId,
        display_name: String,
    },
    ReactionUpdated {
        room: RoomId,
        message_id: MessageId,
        reactions: Vec<Reaction>,
    },
    MessagesRead {
        room: RoomId,
        user_id: UserId,
        read_at: i64,
    },
    ActiveUsers {
        users: Vec<Identity>,
    },
    Error {
        kind: &'static str,
        message: String,
    },
    /// Liveness probe; clients answer with `pong`.
    Ping,
}

impl ServerEvent {
    /// Serialize for the wire. Server events contain only serializable
    /// fields, so this cannot fail for any value we construct.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server event should serialize")
    }
}
