//! Reconnection Policy with Capped Exponential Backoff

use std::time::Duration;

use super::types::StreamConfig;

/// Reconnection policy with capped exponential backoff.
///
/// The counter is incremented before the delay is computed, so with a
/// 1s base the first five delays are 2s, 4s, 8s, 16s and 30s (capped).
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Initial backoff duration.
    initial_backoff: Duration,
    /// Maximum backoff duration.
    max_backoff: Duration,
    /// Maximum attempts before giving up.
    max_attempts: u32,
    /// Current attempt count.
    current_attempt: u32,
}

impl ReconnectPolicy {
    /// Create a new reconnect policy from configuration.
    #[must_use]
    pub const fn new(config: &StreamConfig) -> Self {
        Self::with_params(
            config.initial_backoff,
            config.max_backoff,
            config.max_reconnect_attempts,
        )
    }

    /// Create with custom parameters.
    #[must_use]
    pub const fn with_params(
        initial_backoff: Duration,
        max_backoff: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            initial_backoff,
            max_backoff,
            max_attempts,
            current_attempt: 0,
        }
    }

    /// Delay for `attempt`: `min(initial * 2^attempt, max)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }

    /// Count an attempt and return its delay.
    ///
    /// Returns `None` if max attempts have been reached.
    #[must_use]
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.max_attempts {
            return None;
        }
        self.current_attempt += 1;
        Some(self.delay_for(self.current_attempt))
    }

    /// Reset the policy after a successful connection.
    pub const fn reset(&mut self) {
        self.current_attempt = 0;
    }

    /// Get the current attempt count.
    #[must_use]
    pub const fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    /// Get the maximum attempts allowed.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Check if reconnection should be attempted.
    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        self.current_attempt < self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(&StreamConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn reconnect_policy_default() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.current_attempt(), 0);
        assert_eq!(policy.max_attempts(), 10);
        assert!(policy.should_reconnect());
    }

    #[test]
    fn first_five_delays() {
        let mut policy = ReconnectPolicy::default();
        let delays: Vec<u128> = (0..5)
            .map(|_| policy.next_backoff().unwrap().as_millis())
            .collect();
        assert_eq!(delays, vec![2000, 4000, 8000, 16_000, 30_000]);
        assert_eq!(policy.current_attempt(), 5);
    }

    #[test_case(1, 2_000 ; "first")]
    #[test_case(4, 16_000 ; "fourth")]
    #[test_case(5, 30_000 ; "capped")]
    #[test_case(10, 30_000 ; "last")]
    #[test_case(40, 30_000 ; "overflow saturates")]
    fn delay_for_attempt(attempt: u32, expected_ms: u64) {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(attempt), Duration::from_millis(expected_ms));
    }

    #[test]
    fn reconnect_policy_exhausted() {
        let mut policy =
            ReconnectPolicy::with_params(Duration::from_millis(100), Duration::from_secs(1), 3);

        assert!(policy.next_backoff().is_some());
        assert!(policy.next_backoff().is_some());
        assert!(policy.next_backoff().is_some());
        assert!(policy.next_backoff().is_none());
        assert!(!policy.should_reconnect());
    }

    #[test]
    fn reconnect_policy_reset() {
        let mut policy =
            ReconnectPolicy::with_params(Duration::from_millis(100), Duration::from_secs(1), 3);

        let _ = policy.next_backoff();
        let _ = policy.next_backoff();
        assert_eq!(policy.current_attempt(), 2);

        policy.reset();
        assert_eq!(policy.current_attempt(), 0);
        assert!(policy.should_reconnect());
    }
}
