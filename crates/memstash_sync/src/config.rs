//! Configuration for the sync bridge.

use std::time::Duration;

/// Default interval between sync passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for a [`SyncBridge`](crate::SyncBridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Time between passes.
    pub interval: Duration,
    /// Run the first pass as soon as the bridge starts.
    pub run_immediately: bool,
}

impl SyncConfig {
    /// Creates a configuration with the default interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interval between passes.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs the first pass immediately instead of after one interval.
    #[must_use]
    pub fn with_run_immediately(mut self, run_immediately: bool) -> Self {
        self.run_immediately = run_immediately;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SYNC_INTERVAL,
            run_immediately: false,
        }
    }
}
