//! Identifier and content value objects.
//!
//! Constructors validate raw wire input once; the rest of the engine only
//! ever sees well-formed values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;

/// Opaque handle for one physical socket, scoped to process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh connection id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

const ROOM_ID_MAX_LEN: usize = 128;

/// Caller-supplied room key (chat room path or conversation identifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Empty { field: "room id" });
        }
        if raw.len() > ROOM_ID_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "room id",
                max: ROOM_ID_MAX_LEN,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

const USER_ID_MAX_LEN: usize = 64;

/// Stable user identifier issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Empty { field: "user id" });
        }
        if raw.len() > USER_ID_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "user id",
                max: USER_ID_MAX_LEN,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable message identifier issued by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Empty { field: "message id" });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

const EMOJI_MAX_LEN: usize = 32;

/// Reaction emoji, stored as the client-supplied shortcode or glyph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Emoji(String);

impl Emoji {
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Empty { field: "emoji" });
        }
        if raw.len() > EMOJI_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "emoji",
                max: EMOJI_MAX_LEN,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Emoji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

const MESSAGE_BODY_MAX_LEN: usize = 4000;

/// Chat message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "message body",
            });
        }
        if raw.len() > MESSAGE_BODY_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "message body",
                max: MESSAGE_BODY_MAX_LEN,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
