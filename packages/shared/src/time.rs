//! Time-related utilities with clock abstraction for testability.

use chrono::{TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp in UTC (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_utc_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp in UTC (milliseconds)
pub fn get_utc_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to UTC RFC 3339 format
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    let seconds = timestamp_millis / 1000;
    let nanos = ((timestamp_millis % 1000) * 1_000_000) as u32;
    match Utc.timestamp_opt(seconds, nanos) {
        chrono::LocalResult::Single(dt) => dt.to_rfc3339(),
        _ => String::from("invalid-timestamp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_non_zero_timestamp() {
        // Test item: SystemClock returns a non-zero timestamp
        // given:
        let clock = SystemClock;

        // when:
        let timestamp = clock.now_millis();

        // then:
        assert!(timestamp > 0);
    }

    #[test]
    fn test_system_clock_returns_increasing_timestamps() {
        // Test item: SystemClock returns non-decreasing timestamps across calls
        // given:
        let clock = SystemClock;

        // when:
        let timestamp1 = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let timestamp2 = clock.now_millis();

        // then:
        assert!(timestamp2 >= timestamp1);
    }

    #[test]
    fn test_fixed_clock_returns_fixed_timestamp() {
        // Test item: FixedClock returns the configured timestamp
        // given:
        let fixed_time = 1234567890123;
        let clock = FixedClock::new(fixed_time);

        // when:
        let timestamp = clock.now_millis();

        // then:
        assert_eq!(timestamp, fixed_time);
    }

    #[test]
    fn test_fixed_clock_returns_consistent_timestamp() {
        // Test item: FixedClock returns the same timestamp on repeated calls
        // given:
        let fixed_time = 9876543210987;
        let clock = FixedClock::new(fixed_time);

        // when:
        let timestamp1 = clock.now_millis();
        let timestamp2 = clock.now_millis();

        // then:
        assert_eq!(timestamp1, fixed_time);
        assert_eq!(timestamp2, fixed_time);
    }

    #[test]
    fn test_timestamp_to_rfc3339_format() {
        // Test item: a timestamp converts to RFC 3339 in UTC
        // given:
        // 2023-01-01 00:00:00 UTC in milliseconds
        let timestamp = 1672531200000;

        // when:
        let result = timestamp_to_rfc3339(timestamp);

        // then:
        assert!(result.starts_with("2023-01-01T00:00:00"));
        assert!(result.contains("+00:00"));
    }

    #[test]
    fn test_get_utc_timestamp_returns_positive_value() {
        // Test item: get_utc_timestamp returns a positive value
        // when:
        let timestamp = get_utc_timestamp();

        // then:
        assert!(timestamp > 0);
    }
}
