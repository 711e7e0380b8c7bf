//! UseCase: typing indicators.
//!
//! Typing-start upserts the tracker entry and announces to the other
//! members; typing-stop removes it and does the same. A periodic sweep
//! expires entries whose client went silent (crashed, lost connectivity)
//! and broadcasts the implicit stop exactly once per entry.

use std::sync::Arc;
use std::time::Duration;

use atelier_shared::time::Clock;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::domain::{ConnectionId, Identity, MessagePusher, RoomId, ServerEvent};
use crate::infrastructure::{RoomDirectory, TypingTracker};

use super::error::EventError;

pub struct SetTypingUseCase {
    rooms: Arc<RoomDirectory>,
    typing: Arc<TypingTracker>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl SetTypingUseCase {
    pub fn new(
        rooms: Arc<RoomDirectory>,
        typing: Arc<TypingTracker>,
        pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            rooms,
            typing,
            pusher,
            clock,
            config,
        }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        room: RoomId,
        is_typing: bool,
    ) -> Result<(), EventError> {
        // Typing outside a joined room is silently ignored; the event
        // may have raced a leave.
        if !self.rooms.is_member(&connection_id, &room).await {
            return Ok(());
        }

        if is_typing {
            self.typing
                .set(
                    room.clone(),
                    connection_id,
                    identity.user_id.clone(),
                    identity.display_name.clone(),
                    self.clock.now_millis(),
                )
                .await;
            self.announce(&room, &connection_id, identity, true).await;
        } else if self.typing.clear(&room, &connection_id).await.is_some() {
            self.announce(&room, &connection_id, identity, false).await;
        }

        Ok(())
    }

    /// Expire stale entries and broadcast their implicit stop. Called by
    /// the sweeper task; public so tests can drive it with a fixed clock.
    pub async fn sweep_expired(&self) {
        let expired = self
            .typing
            .sweep_expired(self.clock.now_millis(), self.config.typing_ttl)
            .await;
        for entry in expired {
            tracing::debug!(
                "Typing entry for '{}' in '{}' expired",
                entry.user_id,
                entry.room
            );
            let mut targets = self.rooms.members(&entry.room).await;
            targets.retain(|id| id != &entry.connection_id);
            let event = ServerEvent::UserTyping {
                room: entry.room.clone(),
                user_id: entry.user_id.clone(),
                display_name: entry.display_name.clone(),
                is_typing: false,
            }
            .to_json();
            self.pusher.broadcast(&targets, &event).await;
        }
    }

    /// Spawn the periodic expiry sweep.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep_expired().await;
            }
        })
    }

    async fn announce(
        &self,
        room: &RoomId,
        connection_id: &ConnectionId,
        identity: &Identity,
        is_typing: bool,
    ) {
        let mut targets = self.rooms.members(room).await;
        targets.retain(|id| id != connection_id);
        let event = ServerEvent::UserTyping {
            room: room.clone(),
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            is_typing,
        }
        .to_json();
        self.pusher.broadcast(&targets, &event).await;
    }
}
