//! Store statistics.
//!
//! Counters are atomic and can be read while operations are in progress.
//! All values are monotonically increasing.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store = Store::open(Config::default())?;
//! store.key_store().set("k", "v", None)?;
//!
//! let stats = store.stats();
//! println!("Keys set: {}", stats.keys_set);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all handles of one store.
#[derive(Debug, Default)]
pub struct StoreStats {
    keys_set: AtomicU64,
    keys_deleted: AtomicU64,
    keys_overwritten: AtomicU64,
    keys_evicted: AtomicU64,
    sweeps: AtomicU64,
    manual_purges: AtomicU64,
    documents_created: AtomicU64,
    documents_updated: AtomicU64,
    documents_deleted: AtomicU64,
    documents_synced: AtomicU64,
    sync_failures: AtomicU64,
    queries: AtomicU64,
    snapshots_written: AtomicU64,
    snapshot_failures: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_keys_set(&self, count: u64) {
        self.keys_set.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_keys_deleted(&self, count: u64) {
        self.keys_deleted.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_overwrite(&self) {
        self.keys_overwritten.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_purge(&self, evicted: u64) {
        self.manual_purges.fetch_add(1, Ordering::Relaxed);
        self.keys_evicted.fetch_add(evicted, Ordering::Relaxed);
    }

    pub(crate) fn record_sweep(&self, evicted: u64) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.keys_evicted.fetch_add(evicted, Ordering::Relaxed);
    }

    pub(crate) fn record_documents_created(&self, count: u64) {
        self.documents_created.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_documents_updated(&self, count: u64) {
        self.documents_updated.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_documents_deleted(&self, count: u64) {
        self.documents_deleted.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_sync(&self, synced: u64, failed: u64) {
        self.documents_synced.fetch_add(synced, Ordering::Relaxed);
        self.sync_failures.fetch_add(failed, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_snapshot(&self, ok: bool) {
        if ok {
            self.snapshots_written.fetch_add(1, Ordering::Relaxed);
        } else {
            self.snapshot_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the number of completed sweeps.
    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            keys_set: self.keys_set.load(Ordering::Relaxed),
            keys_deleted: self.keys_deleted.load(Ordering::Relaxed),
            keys_overwritten: self.keys_overwritten.load(Ordering::Relaxed),
            keys_evicted: self.keys_evicted.load(Ordering::Relaxed),
            sweeps: self.sweeps(),
            manual_purges: self.manual_purges.load(Ordering::Relaxed),
            documents_created: self.documents_created.load(Ordering::Relaxed),
            documents_updated: self.documents_updated.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            documents_synced: self.documents_synced.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            snapshots_written: self.snapshots_written.load(Ordering::Relaxed),
            snapshot_failures: self.snapshot_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the store counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Keys inserted by set and set_many.
    pub keys_set: u64,
    /// Keys removed by del and clear.
    pub keys_deleted: u64,
    /// Entries replaced by overwrite or overwrite_with_key.
    pub keys_overwritten: u64,
    /// Keys evicted after their TTL passed, by sweeps or manual purges.
    pub keys_evicted: u64,
    /// Sweeper passes, background or through `Store::sweep_now`.
    pub sweeps: u64,
    /// Calls to `KeyStore::purge_expired`.
    pub manual_purges: u64,
    /// Documents created.
    pub documents_created: u64,
    /// Documents modified by update.
    pub documents_updated: u64,
    /// Documents removed by delete.
    pub documents_deleted: u64,
    /// Documents mirrored to an external sink.
    pub documents_synced: u64,
    /// Failed attempts to mirror a document.
    pub sync_failures: u64,
    /// Queries served, including find and first.
    pub queries: u64,
    /// Snapshots written.
    pub snapshots_written: u64,
    /// Snapshot writes that failed.
    pub snapshot_failures: u64,
}
