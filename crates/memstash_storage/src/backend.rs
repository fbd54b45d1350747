//! Snapshot backend trait definition.

use crate::error::StorageResult;

/// A whole-file snapshot store.
///
/// # Invariants
///
/// - `write_all` replaces the previous snapshot entirely; there is no append
/// - `read_all` returns exactly the bytes of the last successful `write_all`,
///   or `None` if nothing was ever written
/// - A failed `write_all` leaves the previous snapshot readable
/// - Backends must be `Send + Sync`; the sweeper writes from its own thread
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For snapshots on disk
pub trait SnapshotBackend: Send + Sync {
    /// Reads the whole snapshot.
    ///
    /// Returns `Ok(None)` if no snapshot exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn read_all(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the snapshot with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be written durably.
    fn write_all(&self, data: &[u8]) -> StorageResult<()>;

    /// Returns true if a snapshot has been written.
    fn exists(&self) -> bool;
}
