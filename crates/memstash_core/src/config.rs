//! Store configuration.

use crate::logging::{LogConfig, LogSink};
use std::path::PathBuf;
use std::time::Duration;

/// Fixed relative path of the snapshot file when persistence is enabled
/// without an explicit path.
pub const DEFAULT_SNAPSHOT_PATH: &str = "memstash.json";

/// Default interval between sweeper ticks.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interval between background sweeps of expired keys.
    pub sweep_interval: Duration,

    /// TTL applied when a key is set without one (`None` = never expires).
    pub default_ttl: Option<Duration>,

    /// Snapshot file for document persistence (`None` = in-memory only).
    pub snapshot_path: Option<PathBuf>,

    /// Whether to load an existing snapshot when the store opens.
    pub load_snapshot_on_open: bool,

    /// Whether each sweeper tick also writes a snapshot.
    pub persist_on_sweep: bool,

    /// Logging configuration.
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            default_ttl: None,
            snapshot_path: None,
            load_snapshot_on_open: true,
            persist_on_sweep: true,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sweeper interval.
    #[must_use]
    pub const fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the TTL used when a key is set without one.
    #[must_use]
    pub const fn default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Enables persistence to the given snapshot file.
    #[must_use]
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Enables persistence to [`DEFAULT_SNAPSHOT_PATH`].
    #[must_use]
    pub fn with_default_snapshot(self) -> Self {
        self.snapshot_path(DEFAULT_SNAPSHOT_PATH)
    }

    /// Sets whether an existing snapshot is loaded on open.
    #[must_use]
    pub const fn load_snapshot_on_open(mut self, value: bool) -> Self {
        self.load_snapshot_on_open = value;
        self
    }

    /// Sets whether sweeper ticks write a snapshot.
    #[must_use]
    pub const fn persist_on_sweep(mut self, value: bool) -> Self {
        self.persist_on_sweep = value;
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Enables verbose logging to the console.
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.log = LogConfig::new(LogSink::Console).verbose(true);
        self
    }
}
