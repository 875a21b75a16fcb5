//! Backoff for rate-limited connect attempts.

use std::time::Duration;

use crate::config::RetryConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_factor: config.backoff_factor,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), or None once retries are exhausted.
    ///
    /// The server's `hint` replaces the initial delay when present. The result is capped at
    /// `max_delay` but never drops below the hint.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let base = hint.unwrap_or(self.initial_delay).as_millis() as f64;
        let factor = if self.backoff_factor.is_finite() {
            self.backoff_factor.max(1.0)
        } else {
            1.0
        };
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled = base * factor.powi(exponent);
        let cap = self.max_delay.max(hint.unwrap_or_default()).as_millis() as f64;
        let ms = if scaled.is_finite() { scaled.min(cap) } else { cap };
        Some(Duration::from_millis(ms as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backs_off_from_initial_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1, None), Some(Duration::from_secs(5)));
        assert_eq!(policy.delay_for(2, None), Some(Duration::from_secs(10)));
        assert_eq!(policy.delay_for(3, None), Some(Duration::from_secs(20)));
        assert_eq!(policy.delay_for(5, None), Some(Duration::from_secs(60)));
    }

    #[test]
    fn gives_up_after_max_retries() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for(5, None).is_some());
        assert_eq!(policy.delay_for(6, None), None);
        assert_eq!(policy.delay_for(0, None), None);
    }

    #[test]
    fn server_hint_is_honoured_even_above_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_millis(1500))),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(120))),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn built_from_config() {
        let config = RetryConfig {
            max_retries: 1,
            initial_delay_ms: 100,
            max_delay_ms: 150,
            backoff_factor: 3.0,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.delay_for(1, None), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for(2, None), None);
    }
}
