//! State shared by every handle of one store.

use crate::datastore::DocTable;
use crate::keystore::KeyTable;
use crate::stats::StoreStats;
use parking_lot::{Mutex, RwLock};
use std::time::Duration;

/// Everything guarded by the store lock.
///
/// Key entries and document tables sit behind one lock so that sweeps,
/// document mutations and sync passes never interleave.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) keys: KeyTable,
    pub(crate) docs: DocTable,
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) state: RwLock<State>,
    pub(crate) stats: StoreStats,
    pub(crate) default_ttl: Option<Duration>,
    /// Held from encoding to the backend write so snapshots land in order.
    pub(crate) snapshot_lock: Mutex<()>,
}

impl Shared {
    pub(crate) fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            state: RwLock::new(State::default()),
            stats: StoreStats::new(),
            default_ttl,
            snapshot_lock: Mutex::new(()),
        }
    }
}
