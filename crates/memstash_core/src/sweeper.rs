//! Background eviction of expired keys.

use crate::error::CoreResult;
use crate::snapshot::write_snapshot;
use crate::state::Shared;
use crate::task::PeriodicTask;
use memstash_storage::SnapshotBackend;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired keys removed.
    pub evicted: usize,
    /// Whether a snapshot was written during the sweep.
    pub persisted: bool,
}

/// Runs one sweep: persist (when a backend is given), then evict.
///
/// Persistence failures are logged and counted, never returned; the
/// eviction still runs. The write lock is held only for the eviction scan.
pub(crate) fn sweep_once(shared: &Shared, snapshots: Option<&dyn SnapshotBackend>) -> SweepReport {
    let mut report = SweepReport::default();
    if let Some(backend) = snapshots {
        match write_snapshot(shared, backend) {
            Ok(_) => report.persisted = true,
            Err(e) => warn!(error = %e, "snapshot during sweep failed, will retry"),
        }
    }

    let evicted = shared.state.write().keys.purge_expired(Instant::now());
    shared.stats.record_sweep(evicted as u64);
    if evicted > 0 {
        debug!(evicted, "expired keys evicted");
    }
    report.evicted = evicted;
    report
}

/// The periodic sweeper thread owned by a [`Store`](crate::Store).
#[derive(Debug)]
pub(crate) struct Sweeper {
    task: PeriodicTask,
}

impl Sweeper {
    pub(crate) fn spawn(
        shared: Arc<Shared>,
        snapshots: Option<Arc<dyn SnapshotBackend>>,
        interval: Duration,
    ) -> CoreResult<Self> {
        let task = PeriodicTask::spawn("memstash-sweeper", interval, false, move || {
            sweep_once(&shared, snapshots.as_deref());
        })?;
        Ok(Self { task })
    }

    pub(crate) fn stop(&mut self) {
        self.task.stop();
    }
}
