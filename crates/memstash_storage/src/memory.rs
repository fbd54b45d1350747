//! In-memory snapshot backend for testing.

use crate::backend::SnapshotBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-memory snapshot backend.
///
/// Suitable for unit tests, integration tests and stores that want the
/// snapshot code path without touching the file system.
///
/// # Example
///
/// ```rust
/// use memstash_storage::{InMemoryBackend, SnapshotBackend};
///
/// let backend = InMemoryBackend::with_data(b"[]".to_vec());
/// assert!(backend.exists());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
    writes: AtomicU64,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding a pre-existing snapshot.
    ///
    /// Useful for testing load-on-open.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            writes: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the current snapshot, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }

    /// Returns how many times the snapshot was written.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl SnapshotBackend for InMemoryBackend {
    fn read_all(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn write_all(&self, data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(data.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn exists(&self) -> bool {
        self.data.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(!backend.exists());
        assert!(backend.read_all().unwrap().is_none());
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn memory_write_replaces() {
        let backend = InMemoryBackend::new();
        backend.write_all(b"first").unwrap();
        backend.write_all(b"second").unwrap();

        assert_eq!(backend.data().unwrap(), b"second");
        assert_eq!(backend.write_count(), 2);
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"preloaded".to_vec());
        assert_eq!(backend.read_all().unwrap().unwrap(), b"preloaded");
    }
}
