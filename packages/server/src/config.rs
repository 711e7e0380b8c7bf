//! Engine tuning knobs.

use std::time::Duration;

/// Default liveness sweep period.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);
/// Default typing-indicator expiry.
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_secs(10);
/// Default (and maximum) history page size.
pub const DEFAULT_HISTORY_PAGE_LIMIT: usize = 50;

/// Runtime configuration for the realtime engine. Everything here is
/// injectable so tests can shrink the timers.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Period of the liveness sweep; a connection that misses one full
    /// period's probe is evicted on the next tick.
    pub ping_interval: Duration,
    /// Age after which an uncleared typing entry counts as an implicit
    /// stop.
    pub typing_ttl: Duration,
    /// Page size for room history, both the join-time fetch and
    /// `load_more_messages`.
    pub history_page_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            typing_ttl: DEFAULT_TYPING_TTL,
            history_page_limit: DEFAULT_HISTORY_PAGE_LIMIT,
        }
    }
}
