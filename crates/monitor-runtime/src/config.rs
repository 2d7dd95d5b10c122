//! Runtime tuning.
//!
//! The poll interval itself is part of the persisted
//! [`MonitorConfig`](monitor_models::MonitorConfig); these knobs cover the
//! waits around it.

use std::time::Duration;

/// Timing configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// How long to wait before re-checking while monitoring is disabled.
    pub disabled_recheck: Duration,
    /// Back-off after a poll cycle fails unexpectedly.
    pub error_backoff: Duration,
    /// Upper bound for each fetch or send call.
    pub request_timeout: Duration,
    /// How long `stop` waits for the loop to exit.
    pub stop_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            disabled_recheck: Duration::from_secs(5),
            error_backoff: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            stop_timeout: Duration::from_secs(2),
        }
    }
}

impl RuntimeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the disabled re-check delay.
    pub fn with_disabled_recheck(mut self, delay: Duration) -> Self {
        self.disabled_recheck = delay;
        self
    }

    /// Sets the error back-off.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the stop timeout.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();

        assert_eq!(config.disabled_recheck, Duration::from_secs(5));
        assert_eq!(config.error_backoff, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.stop_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_config_builder() {
        let config = RuntimeConfig::new()
            .with_disabled_recheck(Duration::from_millis(100))
            .with_error_backoff(Duration::from_millis(200))
            .with_request_timeout(Duration::from_secs(1))
            .with_stop_timeout(Duration::from_millis(50));

        assert_eq!(config.disabled_recheck, Duration::from_millis(100));
        assert_eq!(config.error_backoff, Duration::from_millis(200));
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert_eq!(config.stop_timeout, Duration::from_millis(50));
    }
}
