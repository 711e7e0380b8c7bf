//! Liveness monitor: periodic ping probes and eviction of silent peers.
//!
//! Each sweep works from a single registry pass: connections that were
//! probed last round and stayed silent are evicted through the normal
//! disconnect cascade; everyone else is probed and flagged. Any inbound
//! event counts as life, so a chatty client that never answers ping is
//! still considered healthy.

use std::sync::Arc;
use std::time::Duration;

use atelier_shared::time::Clock;
use tokio::task::JoinHandle;

use crate::domain::{MessagePusher, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, ProbeSweep};

use super::disconnect::DisconnectUseCase;

pub struct LivenessMonitor {
    registry: Arc<ConnectionRegistry>,
    pusher: Arc<dyn MessagePusher>,
    disconnect: Arc<DisconnectUseCase>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl LivenessMonitor {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<dyn MessagePusher>,
        disconnect: Arc<DisconnectUseCase>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            pusher,
            disconnect,
            clock,
            interval,
        }
    }

    /// One probe/evict round. Public so tests can step the monitor
    /// without waiting on the interval.
    pub async fn sweep_once(&self) -> ProbeSweep {
        let sweep = self
            .registry
            .probe_sweep(self.clock.now_millis(), self.interval)
            .await;

        for connection_id in &sweep.stale {
            tracing::info!(
                "Connection '{}' missed its ping deadline, evicting",
                connection_id
            );
            self.disconnect.execute(*connection_id).await;
        }

        if !sweep.probe.is_empty() {
            let ping = ServerEvent::Ping.to_json();
            self.pusher.broadcast(&sweep.probe, &ping).await;
        }

        sweep
    }

    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_shared::time::FixedClock;

    use crate::domain::ConnectionId;
    use crate::infrastructure::{RoomDirectory, TypingTracker, WebSocketMessagePusher};
    use tokio::sync::mpsc;

    struct Fixture {
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
    }

    fn fixture(now: i64) -> (Fixture, LivenessMonitor) {
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let disconnect = Arc::new(DisconnectUseCase::new(
            registry.clone(),
            Arc::new(RoomDirectory::new()),
            Arc::new(TypingTracker::new()),
            pusher.clone(),
        ));
        let monitor = LivenessMonitor::new(
            registry.clone(),
            pusher.clone(),
            disconnect,
            Arc::new(FixedClock::new(now)),
            Duration::from_secs(30),
        );
        (Fixture { registry, pusher }, monitor)
    }

    async fn connection(f: &Fixture) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let conn = f.registry.register(1_000).await;
        let (tx, rx) = mpsc::unbounded_channel();
        f.pusher.register(conn, tx).await;
        (conn, rx)
    }

    #[tokio::test]
    async fn test_first_sweep_probes_second_sweep_evicts() {
        // Test item: a silent connection survives the probe round and is
        // evicted on the next
        // given:
        let (f, monitor) = fixture(100_000);
        let (conn, mut rx) = connection(&f).await;

        // when: first sweep
        let first = monitor.sweep_once().await;

        // then: probed, not evicted
        assert_eq!(first.probe, vec![conn]);
        assert!(first.stale.is_empty());
        let ping = rx.recv().await.unwrap();
        assert!(ping.contains(r#""type":"ping""#));
        assert!(f.registry.contains(&conn).await);

        // when: still silent at the second sweep
        let second = monitor.sweep_once().await;

        // then: evicted
        assert_eq!(second.stale, vec![conn]);
        assert!(!f.registry.contains(&conn).await);
    }

    #[tokio::test]
    async fn test_back_to_back_sweeps_never_evict_fresh_connections() {
        // Test item: two sweeps inside one probe interval leave a flagged
        // connection alone; eviction needs a full interval of silence
        // given: connection active at t=1s, monitor clock at t=20s with a
        // 30s interval
        let (f, monitor) = fixture(20_000);
        let (conn, _rx) = connection(&f).await;

        // when:
        monitor.sweep_once().await;
        let second = monitor.sweep_once().await;

        // then:
        assert!(second.stale.is_empty());
        assert!(f.registry.contains(&conn).await);
    }

    #[tokio::test]
    async fn test_any_inbound_activity_defuses_the_probe() {
        // Test item: touch between sweeps resets the probe flag, so the
        // connection is re-probed instead of evicted
        // given: a connection already flagged by the first sweep
        let (f, monitor) = fixture(100_000);
        let (conn, _rx) = connection(&f).await;
        monitor.sweep_once().await;

        // when: the client sends anything, then the sweep runs again
        f.registry.touch(&conn, 110_000).await;
        let sweep = monitor.sweep_once().await;

        // then:
        assert!(sweep.stale.is_empty());
        assert_eq!(sweep.probe, vec![conn]);
        assert!(f.registry.contains(&conn).await);
    }
}
