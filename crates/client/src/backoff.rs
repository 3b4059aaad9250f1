//! Reconnect backoff policy: exponential, capped, bounded attempts.

use std::time::Duration;

/// Reconnect attempts before giving up on the stream and falling back
/// to polling.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Poll cadence for the status endpoint once streaming is abandoned.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Delay schedule for stream reconnects.
///
/// Attempt `n` (1-based) waits `base * 2^(n-1)`, capped at `max_delay`.
/// The schedule is non-decreasing by construction.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect attempt.
    pub base: Duration,
    /// Ceiling for all delays.
    pub max_delay: Duration,
    /// Attempts before the observer switches to polling.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            max_delay: Duration::from_secs(15),
            max_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(32);
        let factor = 2u64.saturating_pow(doublings);
        let delay = self
            .base
            .checked_mul(factor.min(u64::from(u32::MAX)) as u32)
            .unwrap_or(self.max_delay);
        delay.min(self.max_delay)
    }

    /// Whether `attempt` (1-based) exceeds the attempt budget.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt > self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_from_one_second() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
    }

    #[test]
    fn delays_cap_at_fifteen_seconds() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(5), Duration::from_secs(15));
        assert_eq!(policy.delay_for(10), Duration::from_secs(15));
        assert_eq!(policy.delay_for(1000), Duration::from_secs(15));
    }

    #[test]
    fn schedule_is_non_decreasing() {
        let policy = ReconnectPolicy::default();
        let mut last = Duration::ZERO;
        for attempt in 1..=policy.max_attempts {
            let delay = policy.delay_for(attempt);
            assert!(delay >= last, "delay shrank at attempt {attempt}");
            last = delay;
        }
    }

    #[test]
    fn attempts_are_bounded() {
        let policy = ReconnectPolicy::default();
        assert!(!policy.is_exhausted(1));
        assert!(!policy.is_exhausted(MAX_RECONNECT_ATTEMPTS));
        assert!(policy.is_exhausted(MAX_RECONNECT_ATTEMPTS + 1));
    }
}
