//! The periodic sync task.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::sink::RowSink;
use memstash_core::{DataStore, PeriodicTask, SyncOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Running totals across bridge passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Passes completed.
    pub passes: u64,
    /// Documents mirrored.
    pub synced: u64,
    /// Failed inserts (a document failing on several passes counts each time).
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    passes: AtomicU64,
    synced: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: SyncOutcome) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.synced.fetch_add(outcome.synced as u64, Ordering::Relaxed);
        self.failed.fetch_add(outcome.failed as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SyncStats {
        SyncStats {
            passes: self.passes.load(Ordering::Relaxed),
            synced: self.synced.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Mirrors unsynced documents to a [`RowSink`] on a fixed interval.
///
/// Each pass offers every document whose `is_synced` flag is false to the
/// sink, under the store's write lock, and marks it synced on success.
/// Failed rows are logged and retried on the next pass, indefinitely.
///
/// The bridge runs on its own thread until [`stop`](Self::stop) is called
/// or it is dropped.
///
/// # Example
///
/// ```rust
/// use memstash_core::{Config, Document, Store};
/// use memstash_sync::{MemorySink, SyncBridge};
///
/// let store = Store::open(Config::default()).unwrap();
/// let users = store.data_store().namespace("user", None).unwrap();
/// users.create(Document::from([("name", "Jane")])).unwrap();
///
/// let sink = MemorySink::new();
/// let outcome = SyncBridge::run_once(&store.data_store(), &sink);
/// assert_eq!(outcome.synced, 1);
/// assert_eq!(sink.rows("users").len(), 1);
/// ```
#[derive(Debug)]
pub struct SyncBridge {
    task: PeriodicTask,
    counters: Arc<Counters>,
}

impl SyncBridge {
    /// Starts the bridge thread.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] for a zero interval, or an I/O
    /// error if the thread cannot be spawned.
    pub fn start(
        data: DataStore,
        sink: Arc<dyn RowSink>,
        config: SyncConfig,
    ) -> SyncResult<Self> {
        if config.interval.is_zero() {
            return Err(SyncError::InvalidConfig(
                "sync interval must be non-zero".into(),
            ));
        }
        let counters = Arc::new(Counters::default());
        let task_counters = Arc::clone(&counters);
        let task = PeriodicTask::spawn(
            "memstash-sync",
            config.interval,
            config.run_immediately,
            move || {
                let outcome = Self::run_once(&data, sink.as_ref());
                task_counters.record(outcome);
            },
        )?;
        info!(interval = ?config.interval, "sync bridge started");
        Ok(Self { task, counters })
    }

    /// Runs a single pass on the calling thread.
    pub fn run_once(data: &DataStore, sink: &dyn RowSink) -> SyncOutcome {
        let outcome = data.sync_pending(|table, row| sink.insert(table, row));
        if outcome.failed > 0 {
            debug!(
                synced = outcome.synced,
                failed = outcome.failed,
                "sync pass left documents pending"
            );
        }
        outcome
    }

    /// Returns totals across the passes run by this bridge's thread.
    pub fn stats(&self) -> SyncStats {
        self.counters.snapshot()
    }

    /// Returns true until the bridge has been stopped.
    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Signals the thread and waits for it to exit.
    ///
    /// A pass in progress finishes first. Calling `stop` twice is a no-op.
    pub fn stop(&mut self) {
        if self.task.is_running() {
            self.task.stop();
            info!("sync bridge stopped");
        }
    }
}

impl Drop for SyncBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use memstash_core::{Config, Document, Store};
    use std::time::Duration;

    #[test]
    fn zero_interval_rejected() {
        let store = Store::open(Config::default()).unwrap();
        let sink: Arc<dyn RowSink> = Arc::new(MemorySink::new());
        let err = SyncBridge::start(
            store.data_store(),
            sink,
            SyncConfig::new().with_interval(Duration::ZERO),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
    }

    #[test]
    fn run_once_is_idempotent_for_synced_documents() {
        let store = Store::open(Config::default()).unwrap();
        let users = store.data_store().namespace("user", None).unwrap();
        users.create(Document::from([("name", "Jane")])).unwrap();

        let sink = MemorySink::new();
        assert_eq!(SyncBridge::run_once(&store.data_store(), &sink).synced, 1);
        assert_eq!(SyncBridge::run_once(&store.data_store(), &sink).synced, 0);
        assert_eq!(sink.total_rows(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let store = Store::open(Config::default()).unwrap();
        let sink: Arc<dyn RowSink> = Arc::new(MemorySink::new());
        let mut bridge =
            SyncBridge::start(store.data_store(), sink, SyncConfig::default()).unwrap();
        assert!(bridge.is_running());
        bridge.stop();
        bridge.stop();
        assert!(!bridge.is_running());
        assert_eq!(bridge.stats(), SyncStats::default());
    }
}
