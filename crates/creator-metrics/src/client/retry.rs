//! Retry policy for provider requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial request.
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    pub initial_delay_ms: u64,
    /// Ceiling for any single delay in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add up to 25% jitter to delays.
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            use_jitter: false,
        }
    }
}

impl RetryConfig {
    /// Delay before the nth retry (1-based): `min(initial * multiplier^(n-1), max)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);

        let delay_ms = base_delay.min(self.max_delay_ms as f64) as u64;

        let final_delay = if self.use_jitter {
            let jitter = (delay_ms as f64 * 0.25 * rand::random::<f64>()) as u64;
            (delay_ms + jitter).min(self.max_delay_ms)
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }

    /// Whether another retry is allowed after `retries_used` retries.
    pub fn should_retry(&self, retries_used: u32) -> bool {
        retries_used < self.max_retries
    }

    /// Worst-case time spent sleeping across every retry.
    pub fn total_backoff(&self) -> Duration {
        (1..=self.max_retries)
            .map(|attempt| self.delay_for_attempt(attempt))
            .sum()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(config.should_retry(0));
        assert!(config.should_retry(2));
        assert!(!config.should_retry(3));
    }

    #[test]
    fn test_retry_delay_sequence() {
        let config = RetryConfig::default();

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(4000));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(8000));
        assert_eq!(config.delay_for_attempt(5), Duration::from_millis(10_000));
        assert_eq!(config.delay_for_attempt(40), Duration::from_millis(10_000));
    }

    #[test]
    fn test_delay_matches_closed_form() {
        let config = RetryConfig::default();
        for n in 1..=12u32 {
            let expected = (1000u64 * 2u64.pow(n - 1)).min(10_000);
            assert_eq!(config.delay_for_attempt(n), Duration::from_millis(expected));
        }
    }

    #[test]
    fn test_jitter_never_exceeds_ceiling() {
        let config = RetryConfig {
            use_jitter: true,
            ..Default::default()
        };
        for n in 1..=8 {
            let delay = config.delay_for_attempt(n);
            assert!(delay <= Duration::from_millis(config.max_delay_ms));
            assert!(delay >= RetryConfig::default().delay_for_attempt(n));
        }
    }

    #[test]
    fn test_total_backoff() {
        let config = RetryConfig::default();
        assert_eq!(config.total_backoff(), Duration::from_millis(7000));
        assert_eq!(
            config.with_max_retries(0).total_backoff(),
            Duration::ZERO
        );
    }
}
