//! The store container.

use crate::config::Config;
use crate::datastore::DataStore;
use crate::error::{CoreError, CoreResult};
use crate::keystore::KeyStore;
use crate::logging::init_logging;
use crate::snapshot::{read_snapshot, write_snapshot};
use crate::state::Shared;
use crate::stats::StatsSnapshot;
use crate::sweeper::{sweep_once, SweepReport, Sweeper};
use memstash_storage::{FileBackend, SnapshotBackend};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// A paired key store and data store sharing one lock and one sweeper.
///
/// `Store` owns the background sweeper; the [`KeyStore`] and [`DataStore`]
/// handles it hands out stay usable after the store is dropped, but no
/// further sweeps or snapshots happen.
///
/// # Example
///
/// ```rust
/// use memstash_core::{Config, Document, Store};
/// use std::time::Duration;
///
/// let store = Store::open(Config::default()).unwrap();
///
/// let keys = store.key_store();
/// keys.set("session", "abc", Some(Duration::from_secs(300))).unwrap();
/// assert!(keys.set("session", "other", None).is_err());
///
/// let users = store.data_store().namespace("user", None).unwrap();
/// users.create(Document::from([("Name", "Jane")])).unwrap();
/// assert_eq!(users.query(&Document::from([("name", "Jane")])).len(), 1);
/// ```
pub struct Store {
    shared: Arc<Shared>,
    snapshots: Option<Arc<dyn SnapshotBackend>>,
    sweeper: Option<Sweeper>,
    config: Config,
}

impl Store {
    /// Opens a store.
    ///
    /// When `config.snapshot_path` is set the snapshot file is locked,
    /// loaded (if present and `load_snapshot_on_open`), and rewritten on
    /// every sweep (if `persist_on_sweep`).
    ///
    /// # Errors
    ///
    /// Returns an error for a zero sweep interval, a snapshot file locked by
    /// another store, or a snapshot that cannot be read.
    pub fn open(config: Config) -> CoreResult<Self> {
        let snapshots: Option<Arc<dyn SnapshotBackend>> = match &config.snapshot_path {
            Some(path) => {
                let backend: Arc<dyn SnapshotBackend> =
                    Arc::new(FileBackend::open_with_create_dirs(path)?);
                Some(backend)
            }
            None => None,
        };
        Self::build(config, snapshots)
    }

    /// Opens a store persisting to a custom backend.
    ///
    /// `config.snapshot_path` is ignored.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open).
    pub fn open_with_backend(config: Config, backend: Box<dyn SnapshotBackend>) -> CoreResult<Self> {
        Self::build(config, Some(Arc::from(backend)))
    }

    fn build(config: Config, snapshots: Option<Arc<dyn SnapshotBackend>>) -> CoreResult<Self> {
        if config.sweep_interval.is_zero() {
            return Err(CoreError::invalid_config("sweep interval must be non-zero"));
        }
        init_logging(&config.log)?;

        let shared = Arc::new(Shared::new(config.default_ttl));
        if config.load_snapshot_on_open {
            if let Some(backend) = &snapshots {
                read_snapshot(&shared, backend.as_ref())?;
            }
        }

        let sweep_backend = snapshots.clone().filter(|_| config.persist_on_sweep);
        let sweeper = Sweeper::spawn(Arc::clone(&shared), sweep_backend, config.sweep_interval)?;
        info!(
            interval = ?config.sweep_interval,
            persistent = snapshots.is_some(),
            "store opened"
        );

        Ok(Self {
            shared,
            snapshots,
            sweeper: Some(sweeper),
            config,
        })
    }

    /// Returns a handle to the key store.
    pub fn key_store(&self) -> KeyStore {
        KeyStore::new(Arc::clone(&self.shared))
    }

    /// Returns a handle to the data store.
    pub fn data_store(&self) -> DataStore {
        DataStore::new(Arc::clone(&self.shared))
    }

    /// Returns the configuration the store was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns true if the store has a snapshot backend.
    pub fn is_persistent(&self) -> bool {
        self.snapshots.is_some()
    }

    /// Writes a snapshot now and returns the number of documents written.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if no snapshot backend is
    /// configured, or the backend's error if the write fails.
    pub fn persist(&self) -> CoreResult<usize> {
        let backend = self
            .snapshots
            .as_deref()
            .ok_or_else(|| CoreError::invalid_config("persistence is not configured"))?;
        write_snapshot(&self.shared, backend)
    }

    /// Runs one sweep on the calling thread, exactly as the sweeper would.
    pub fn sweep_now(&self) -> SweepReport {
        let backend = self
            .snapshots
            .as_deref()
            .filter(|_| self.config.persist_on_sweep);
        sweep_once(&self.shared, backend)
    }

    /// Returns a snapshot of the store's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Stops the sweeper and writes a final snapshot if persistence is on.
    ///
    /// # Errors
    ///
    /// Returns the snapshot write error, if any.
    pub fn close(mut self) -> CoreResult<()> {
        if let Some(mut sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
        if let Some(backend) = self.snapshots.as_deref() {
            write_snapshot(&self.shared, backend)?;
        }
        info!("store closed");
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Some(mut sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("persistent", &self.is_persistent())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::Document;
    use memstash_storage::InMemoryBackend;
    use std::time::Duration;

    #[test]
    fn zero_interval_rejected() {
        let err = Store::open(Config::default().sweep_interval(Duration::ZERO)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn handles_share_state() {
        let store = Store::open(Config::default()).unwrap();
        store.key_store().set("a", 1, None).unwrap();
        assert_eq!(store.key_store().size(), 1);
        assert_eq!(store.stats().keys_set, 1);
    }

    #[test]
    fn persist_without_backend_fails() {
        let store = Store::open(Config::default()).unwrap();
        assert!(matches!(
            store.persist(),
            Err(CoreError::InvalidConfig { .. })
        ));
        assert!(!store.is_persistent());
    }

    #[test]
    fn load_on_open_from_backend() {
        let backend = InMemoryBackend::with_data(
            br#"[{"_namespace": "users", "name": "Jane", "is_synced": true}]"#.to_vec(),
        );
        let store = Store::open_with_backend(Config::default(), Box::new(backend)).unwrap();
        let ds = store.data_store();
        assert_eq!(ds.list_namespaces(), vec!["users"]);
        assert_eq!(ds.unsynced_count(), 0);

        let users = ds.namespace("users", None).unwrap();
        assert_eq!(users.query(&Document::from([("name", "Jane")])).len(), 1);
    }

    #[test]
    fn skip_load_when_disabled() {
        let backend = InMemoryBackend::with_data(br#"[{"_namespace": "users"}]"#.to_vec());
        let config = Config::default().load_snapshot_on_open(false);
        let store = Store::open_with_backend(config, Box::new(backend)).unwrap();
        assert!(store.data_store().list_namespaces().is_empty());
    }

    #[test]
    fn sweep_now_evicts() {
        let store = Store::open(Config::default()).unwrap();
        let keys = store.key_store();
        keys.set("gone", 1, Some(Duration::ZERO)).unwrap();
        keys.set("kept", 2, None).unwrap();

        let report = store.sweep_now();
        assert_eq!(report.evicted, 1);
        assert!(!report.persisted);
        assert_eq!(keys.keys(), vec!["kept"]);
    }
}
