//! Domain layer: validated value objects, entities, wire events, and the
//! ports (collaborator interfaces) the engine depends on.

pub mod error;
pub mod event;
pub mod identity;
pub mod ids;
pub mod message;
pub mod ports;

pub use error::ValidationError;
pub use event::{ClientEvent, ServerEvent};
pub use identity::{Identity, Role};
pub use ids::{ConnectionId, Emoji, MessageBody, MessageId, RoomId, UserId};
pub use message::{Message, NewMessage, Reaction};
pub use ports::{
    AuthError, IdentityVerifier, MessagePushError, MessagePusher, MessageStore, PusherChannel,
    StoreError,
};
