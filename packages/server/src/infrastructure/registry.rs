//! Connection registry: presence metadata for every live socket.
//!
//! Exactly one owner for connection state. Entries are created on socket
//! open (unauthenticated), gain an identity on successful authentication,
//! and disappear on socket close or liveness eviction. Operations on an
//! unknown id report not-found instead of panicking, which tolerates
//! races between disconnect and in-flight events.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Identity, RoomId};

/// Per-connection presence metadata.
#[derive(Debug, Clone)]
struct ConnectionEntry {
    identity: Option<Identity>,
    connected_at: i64,
    last_pong_at: i64,
    /// Set when a probe is sent; cleared by any inbound event. A
    /// connection still flagged at the next sweep is presumed dead.
    awaiting_pong: bool,
    /// Room the connection is "active" in for typing purposes.
    active_room: Option<RoomId>,
}

/// Result of one liveness sweep pass over the registry.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProbeSweep {
    /// Connections that never answered the previous probe.
    pub stale: Vec<ConnectionId>,
    /// Connections that should receive a fresh probe.
    pub probe: Vec<ConnectionId>,
}

/// Mutex-guarded map of connection id to presence metadata.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an unauthenticated connection.
    pub async fn register(&self, now: i64) -> ConnectionId {
        let id = ConnectionId::generate();
        let mut connections = self.connections.lock().await;
        connections.insert(
            id,
            ConnectionEntry {
                identity: None,
                connected_at: now,
                last_pong_at: now,
                awaiting_pong: false,
                active_room: None,
            },
        );
        tracing::debug!("Connection '{}' registered", id);
        id
    }

    /// Attach a verified identity. Repeat calls replace the identity,
    /// which keeps re-authentication idempotent. Returns false if the
    /// connection is gone.
    pub async fn attach_identity(&self, id: &ConnectionId, identity: Identity) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get_mut(id) {
            Some(entry) => {
                entry.identity = Some(identity);
                true
            }
            None => false,
        }
    }

    pub async fn identity_of(&self, id: &ConnectionId) -> Option<Identity> {
        let connections = self.connections.lock().await;
        connections.get(id).and_then(|entry| entry.identity.clone())
    }

    /// Record a liveness pulse. Called for every inbound event, not just
    /// pongs, so a busy client never looks dead.
    pub async fn touch(&self, id: &ConnectionId, now: i64) {
        let mut connections = self.connections.lock().await;
        if let Some(entry) = connections.get_mut(id) {
            entry.last_pong_at = now;
            entry.awaiting_pong = false;
        }
    }

    /// Remember which room the connection is active in.
    pub async fn set_active_room(&self, id: &ConnectionId, room: Option<RoomId>) {
        let mut connections = self.connections.lock().await;
        if let Some(entry) = connections.get_mut(id) {
            entry.active_room = room;
        }
    }

    pub async fn active_room_of(&self, id: &ConnectionId) -> Option<RoomId> {
        let connections = self.connections.lock().await;
        connections.get(id).and_then(|entry| entry.active_room.clone())
    }

    /// Remove a connection, returning the identity it carried (if any).
    /// The outer Option distinguishes "was registered" from a repeat call,
    /// which is a no-op.
    pub async fn remove(&self, id: &ConnectionId) -> Option<Option<Identity>> {
        let mut connections = self.connections.lock().await;
        connections.remove(id).map(|entry| entry.identity)
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        let connections = self.connections.lock().await;
        connections.contains_key(id)
    }

    pub async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }

    /// Snapshot of online identities, deduplicated by user id (one user
    /// may hold several connections) and sorted for stable output.
    pub async fn online_identities(&self) -> Vec<Identity> {
        let connections = self.connections.lock().await;
        let mut by_user: HashMap<&str, &Identity> = HashMap::new();
        for entry in connections.values() {
            if let Some(identity) = &entry.identity {
                by_user.entry(identity.user_id.as_str()).or_insert(identity);
            }
        }
        let mut identities: Vec<Identity> = by_user.into_values().cloned().collect();
        identities.sort_by(|a, b| a.user_id.as_str().cmp(b.user_id.as_str()));
        identities
    }

    /// One sweep pass: collect connections that ignored the previous
    /// probe and flag everyone else as awaiting the next one. Collecting
    /// and flagging under a single lock keeps the sweep atomic against
    /// concurrent touches. Staleness requires both the outstanding probe
    /// flag and at least `min_silence` since the last recorded pulse, so
    /// back-to-back sweeps (missed-tick catch-up) never evict a
    /// connection that was probed moments ago.
    pub async fn probe_sweep(&self, now: i64, min_silence: Duration) -> ProbeSweep {
        let min_silence_millis = min_silence.as_millis() as i64;
        let mut connections = self.connections.lock().await;
        let mut sweep = ProbeSweep::default();
        for (id, entry) in connections.iter_mut() {
            if entry.awaiting_pong {
                if now - entry.last_pong_at >= min_silence_millis {
                    sweep.stale.push(*id);
                }
            } else {
                entry.awaiting_pong = true;
                sweep.probe.push(*id);
            }
        }
        sweep
    }

    /// Full snapshot of (connection, identity, connected_at) rows for the
    /// debug presence endpoint.
    pub async fn snapshot(&self) -> Vec<(ConnectionId, Option<Identity>, i64)> {
        let connections = self.connections.lock().await;
        connections
            .iter()
            .map(|(id, entry)| (*id, entry.identity.clone(), entry.connected_at))
            .collect()
    }
}
