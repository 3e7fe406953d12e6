//! Jittered exponential back-off for the presence feed.

use std::time::Duration;

use pl_domain::config::PresenceConfig;

/// How long the presence feed waits before re-subscribing after a drop.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    pub initial_delay: Duration,
    /// Cap on the delay, before jitter.
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::from_config(&PresenceConfig::default())
    }
}

impl ReconnectBackoff {
    pub fn from_config(cfg: &PresenceConfig) -> Self {
        Self {
            initial_delay: cfg.reconnect_initial(),
            max_delay: cfg.reconnect_max(),
            backoff_factor: 2.0,
        }
    }

    /// Delay before the given (0-indexed) attempt, with up to 25% jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_delay.as_millis() as f64;
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay_ms = base_ms * self.backoff_factor.powi(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        let jitter = capped_ms * 0.25 * jitter_fraction(attempt);
        Duration::from_millis((capped_ms + jitter) as u64)
    }
}

/// Deterministic fraction in [0, 1) from the attempt number.
fn jitter_fraction(attempt: u32) -> f64 {
    let hash = attempt.wrapping_mul(2_654_435_761);
    f64::from(hash) / f64::from(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_presence_config() {
        let b = ReconnectBackoff::default();
        assert_eq!(b.initial_delay, Duration::from_secs(1));
        assert_eq!(b.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn delay_grows_then_caps() {
        let b = ReconnectBackoff::from_config(&PresenceConfig {
            reconnect_initial_ms: 100,
            reconnect_max_ms: 1_000,
            ..Default::default()
        });
        assert!(b.delay_for_attempt(1) > b.delay_for_attempt(0));
        assert!(b.delay_for_attempt(2) > b.delay_for_attempt(1));
        // 1000ms cap plus at most 25% jitter.
        assert!(b.delay_for_attempt(40) <= Duration::from_millis(1_250));
        assert!(b.delay_for_attempt(u32::MAX) <= Duration::from_millis(1_250));
    }

    #[test]
    fn first_attempt_has_no_jitter() {
        let b = ReconnectBackoff::default();
        assert_eq!(b.delay_for_attempt(0), Duration::from_secs(1));
    }
}
