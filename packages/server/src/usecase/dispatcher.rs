//! Protocol handler: decode one inbound frame and route it.
//!
//! Every frame counts as liveness for its connection, including frames
//! that fail to decode. Handler failures never leak past this layer;
//! they are reported to the offending connection as an `error` event
//! and the session continues.

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{
    ClientEvent, ConnectionId, Emoji, Identity, MessageBody, MessageId, MessagePusher, RoomId,
    ServerEvent,
};
use crate::infrastructure::ConnectionRegistry;

use super::authenticate::AuthenticateUseCase;
use super::delete_message::DeleteMessageUseCase;
use super::edit_message::EditMessageUseCase;
use super::error::EventError;
use super::join_room::JoinRoomUseCase;
use super::leave_room::LeaveRoomUseCase;
use super::load_history::LoadHistoryUseCase;
use super::mark_read::MarkReadUseCase;
use super::send_message::SendMessageUseCase;
use super::set_typing::SetTypingUseCase;
use super::toggle_reaction::ToggleReactionUseCase;

pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    authenticate: Arc<AuthenticateUseCase>,
    join_room: Arc<JoinRoomUseCase>,
    leave_room: Arc<LeaveRoomUseCase>,
    send_message: Arc<SendMessageUseCase>,
    edit_message: Arc<EditMessageUseCase>,
    delete_message: Arc<DeleteMessageUseCase>,
    set_typing: Arc<SetTypingUseCase>,
    toggle_reaction: Arc<ToggleReactionUseCase>,
    mark_read: Arc<MarkReadUseCase>,
    load_history: Arc<LoadHistoryUseCase>,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        authenticate: Arc<AuthenticateUseCase>,
        join_room: Arc<JoinRoomUseCase>,
        leave_room: Arc<LeaveRoomUseCase>,
        send_message: Arc<SendMessageUseCase>,
        edit_message: Arc<EditMessageUseCase>,
        delete_message: Arc<DeleteMessageUseCase>,
        set_typing: Arc<SetTypingUseCase>,
        toggle_reaction: Arc<ToggleReactionUseCase>,
        mark_read: Arc<MarkReadUseCase>,
        load_history: Arc<LoadHistoryUseCase>,
    ) -> Self {
        Self {
            registry,
            pusher,
            clock,
            authenticate,
            join_room,
            leave_room,
            send_message,
            edit_message,
            delete_message,
            set_typing,
            toggle_reaction,
            mark_read,
            load_history,
        }
    }

    /// Handle one text frame from a connection. Failures are pushed back
    /// to the sender as `error` events; nothing propagates to the caller.
    pub async fn handle_text(&self, connection_id: ConnectionId, text: &str) {
        self.registry
            .touch(&connection_id, self.clock.now_millis())
            .await;

        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(error) => {
                self.report(
                    &connection_id,
                    &EventError::Malformed(format!("invalid event: {error}")),
                )
                .await;
                return;
            }
        };

        if let Err(error) = self.route(connection_id, event).await {
            self.report(&connection_id, &error).await;
        }
    }

    /// One exhaustive match over the wire kinds. Every arm that needs an
    /// identity fetches it through the auth gate itself, so adding a new
    /// kind forces an explicit decision about its gating.
    async fn route(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), EventError> {
        match event {
            // touch() above already recorded the activity.
            ClientEvent::Pong => Ok(()),
            ClientEvent::Authenticate { token } => {
                self.authenticate.execute(connection_id, &token).await?;
                Ok(())
            }
            ClientEvent::JoinRoom { room } => {
                let identity = self.identity_of(&connection_id).await?;
                self.join_room
                    .execute(connection_id, &identity, RoomId::new(room)?)
                    .await
            }
            ClientEvent::LeaveRoom { room } => {
                let identity = self.identity_of(&connection_id).await?;
                self.leave_room
                    .execute(connection_id, &identity, RoomId::new(room)?)
                    .await
            }
            ClientEvent::SendMessage { room, content } => {
                let identity = self.identity_of(&connection_id).await?;
                self.send_message
                    .execute(
                        connection_id,
                        &identity,
                        RoomId::new(room)?,
                        MessageBody::new(content)?,
                    )
                    .await?;
                Ok(())
            }
            ClientEvent::EditMessage {
                message_id,
                content,
            } => {
                let identity = self.identity_of(&connection_id).await?;
                self.edit_message
                    .execute(
                        &identity,
                        MessageId::new(message_id)?,
                        MessageBody::new(content)?,
                    )
                    .await?;
                Ok(())
            }
            ClientEvent::DeleteMessage { message_id } => {
                let identity = self.identity_of(&connection_id).await?;
                self.delete_message
                    .execute(&identity, MessageId::new(message_id)?)
                    .await
            }
            ClientEvent::Typing { room, is_typing } => {
                let identity = self.identity_of(&connection_id).await?;
                self.set_typing
                    .execute(connection_id, &identity, RoomId::new(room)?, is_typing)
                    .await
            }
            ClientEvent::AddReaction { message_id, emoji } => {
                let identity = self.identity_of(&connection_id).await?;
                self.toggle_reaction
                    .execute(&identity, MessageId::new(message_id)?, Emoji::new(emoji)?)
                    .await
            }
            ClientEvent::MarkAsRead { room } => {
                let identity = self.identity_of(&connection_id).await?;
                self.mark_read.execute(&identity, RoomId::new(room)?).await
            }
            ClientEvent::LoadMoreMessages {
                room,
                before,
                limit,
            } => {
                self.identity_of(&connection_id).await?;
                let before = before.map(MessageId::new).transpose()?;
                self.load_history
                    .execute(connection_id, RoomId::new(room)?, before, limit)
                    .await
            }
        }
    }

    async fn identity_of(&self, connection_id: &ConnectionId) -> Result<Identity, EventError> {
        self.registry
            .identity_of(connection_id)
            .await
            .ok_or(EventError::Unauthenticated)
    }

    async fn report(&self, connection_id: &ConnectionId, error: &EventError) {
        tracing::debug!("Rejected event from '{}': {}", connection_id, error);
        let event = ServerEvent::Error {
            kind: error.kind(),
            message: error.to_string(),
        }
        .to_json();
        if let Err(push_error) = self.pusher.push_to(connection_id, &event).await {
            tracing::warn!(
                "Failed to report error to '{}': {}",
                connection_id,
                push_error
            );
        }
    }
}
