//! Typing indicator tracker.
//!
//! Short-lived, self-expiring per-room state. At most one entry per
//! (room, connection); entries auto-expire so a client that crashes
//! mid-keystroke does not leave a stuck indicator behind.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, RoomId, UserId};

/// Ephemeral "user is typing" marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEntry {
    pub room: RoomId,
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: String,
    pub started_at: i64,
}

/// Mutex-guarded map of room to its active typing entries.
#[derive(Default)]
pub struct TypingTracker {
    entries: Mutex<HashMap<RoomId, HashMap<ConnectionId, TypingEntry>>>,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert an entry with a fresh timestamp. Returns false when the
    /// connection was already marked as typing in this room.
    pub async fn set(
        &self,
        room: RoomId,
        connection_id: ConnectionId,
        user_id: UserId,
        display_name: String,
        now: i64,
    ) -> bool {
        let mut entries = self.entries.lock().await;
        let room_entries = entries.entry(room.clone()).or_default();
        room_entries
            .insert(
                connection_id,
                TypingEntry {
                    room,
                    connection_id,
                    user_id,
                    display_name,
                    started_at: now,
                },
            )
            .is_none()
    }

    /// Drop the entry for (room, connection). Returns the removed entry
    /// so the caller can broadcast the stop; `None` when there was none.
    pub async fn clear(
        &self,
        room: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<TypingEntry> {
        let mut entries = self.entries.lock().await;
        let room_entries = entries.get_mut(room)?;
        let removed = room_entries.remove(connection_id);
        if room_entries.is_empty() {
            entries.remove(room);
        }
        removed
    }

    /// Drop every entry a connection owns, across all rooms. Used by the
    /// disconnect cascade.
    pub async fn clear_connection(&self, connection_id: &ConnectionId) -> Vec<TypingEntry> {
        let mut entries = self.entries.lock().await;
        let mut removed = Vec::new();
        entries.retain(|_, room_entries| {
            if let Some(entry) = room_entries.remove(connection_id) {
                removed.push(entry);
            }
            !room_entries.is_empty()
        });
        removed
    }

    /// Remove and return entries older than `ttl`. Each expired entry is
    /// returned exactly once, so the sweeper broadcasts exactly one
    /// implicit stop per entry.
    pub async fn sweep_expired(&self, now: i64, ttl: Duration) -> Vec<TypingEntry> {
        let cutoff = now - ttl.as_millis() as i64;
        let mut entries = self.entries.lock().await;
        let mut expired = Vec::new();
        entries.retain(|_, room_entries| {
            room_entries.retain(|_, entry| {
                if entry.started_at <= cutoff {
                    expired.push(entry.clone());
                    false
                } else {
                    true
                }
            });
            !room_entries.is_empty()
        });
        expired
    }
}
