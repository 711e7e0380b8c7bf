//! Room directory: which connections are subscribed to which rooms.
//!
//! A pure in-memory index, never a source of truth for message content.
//! Rooms are created lazily on first join and garbage collected when the
//! last member leaves. The forward and reverse maps live under one mutex
//! so they can never disagree.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, RoomId};

#[derive(Default)]
struct DirectoryInner {
    room_members: HashMap<RoomId, HashSet<ConnectionId>>,
    member_rooms: HashMap<ConnectionId, HashSet<RoomId>>,
}

/// Outcome of a leave operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// False when the connection was not a member (no-op leave).
    pub removed: bool,
    /// Members left behind, already snapshotted for broadcasting.
    pub remaining: Vec<ConnectionId>,
}

/// Mutex-guarded two-way index of room membership.
#[derive(Default)]
pub struct RoomDirectory {
    inner: Mutex<DirectoryInner>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room. Set semantics: a repeat join is a
    /// no-op and reports `false`.
    pub async fn join(&self, connection_id: ConnectionId, room: RoomId) -> bool {
        let mut inner = self.inner.lock().await;
        let newly = inner
            .room_members
            .entry(room.clone())
            .or_default()
            .insert(connection_id);
        inner
            .member_rooms
            .entry(connection_id)
            .or_default()
            .insert(room.clone());
        if newly {
            tracing::debug!("Connection '{}' joined room '{}'", connection_id, room);
        }
        newly
    }

    /// Remove a connection from a room, deleting the room when it
    /// becomes empty.
    pub async fn leave(&self, connection_id: &ConnectionId, room: &RoomId) -> LeaveOutcome {
        let mut inner = self.inner.lock().await;
        let Some(members) = inner.room_members.get_mut(room) else {
            return LeaveOutcome {
                removed: false,
                remaining: Vec::new(),
            };
        };
        let removed = members.remove(connection_id);
        let remaining: Vec<ConnectionId> = members.iter().copied().collect();
        if members.is_empty() {
            inner.room_members.remove(room);
            tracing::debug!("Room '{}' is empty and was dropped", room);
        }
        if let Some(rooms) = inner.member_rooms.get_mut(connection_id) {
            rooms.remove(room);
            if rooms.is_empty() {
                inner.member_rooms.remove(connection_id);
            }
        }
        LeaveOutcome { removed, remaining }
    }

    /// Membership snapshot for fan-out. Computed once under the lock;
    /// delivery happens afterwards, so a concurrent leave simply means a
    /// skipped send.
    pub async fn members(&self, room: &RoomId) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .room_members
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn is_member(&self, connection_id: &ConnectionId, room: &RoomId) -> bool {
        let inner = self.inner.lock().await;
        inner
            .room_members
            .get(room)
            .is_some_and(|members| members.contains(connection_id))
    }

    pub async fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let inner = self.inner.lock().await;
        inner
            .member_rooms
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Cascade a disconnect: drop the connection from every room it
    /// joined and return, per room, the members left behind.
    pub async fn remove_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Vec<(RoomId, Vec<ConnectionId>)> {
        let mut inner = self.inner.lock().await;
        let Some(rooms) = inner.member_rooms.remove(connection_id) else {
            return Vec::new();
        };
        let mut affected = Vec::with_capacity(rooms.len());
        for room in rooms {
            if let Some(members) = inner.room_members.get_mut(&room) {
                members.remove(connection_id);
                let remaining: Vec<ConnectionId> = members.iter().copied().collect();
                if members.is_empty() {
                    inner.room_members.remove(&room);
                }
                affected.push((room, remaining));
            }
        }
        affected
    }

    /// (room, member count) rows for the debug presence endpoint.
    pub async fn room_counts(&self) -> Vec<(RoomId, usize)> {
        let inner = self.inner.lock().await;
        inner
            .room_members
            .iter()
            .map(|(room, members)| (room.clone(), members.len()))
            .collect()
    }
}
