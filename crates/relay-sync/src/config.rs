//! Reconciler tuning knobs

use std::time::Duration;

/// Timing policy for one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Delay between a push notice and the fetch it schedules; bursts of
    /// notices inside this window coalesce into one fetch
    pub debounce: Duration,
    /// Minimum gap after a completed fetch before another may start;
    /// requests inside the gap are dropped, not queued
    pub min_fetch_interval: Duration,
    /// Fixed fallback polling period; bounds staleness when the push
    /// channel drops notices
    pub poll_interval: Duration,
    /// Capacity of the one-shot notification channel
    pub event_buffer: usize,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With debounce delay
    #[inline]
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// With minimum inter-fetch interval
    #[inline]
    #[must_use]
    pub fn with_min_fetch_interval(mut self, interval: Duration) -> Self {
        self.min_fetch_interval = interval;
        self
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            min_fetch_interval: Duration::from_millis(500),
            poll_interval: Duration::from_secs(3),
            event_buffer: 32,
        }
    }
}
