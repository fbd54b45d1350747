//! File-based snapshot backend.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file-based snapshot backend.
///
/// The snapshot lives in a single file. Writes go to a sibling `.tmp` file
/// which is synced and then renamed over the snapshot, so readers only
/// ever see a complete snapshot.
///
/// # Locking
///
/// The backend holds an advisory exclusive lock on a sibling `.lock` file
/// for its whole lifetime. A second backend (in this or another process)
/// opening the same path fails with [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use memstash_storage::{FileBackend, SnapshotBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("memstash.json")).unwrap();
/// backend.write_all(b"[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    temp_path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
    /// Serializes writers inside this process.
    write_guard: Mutex<()>,
}

impl FileBackend {
    /// Opens a snapshot backend at the given path.
    ///
    /// The snapshot file itself is not created until the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The lock file cannot be created
    /// - Another backend holds the lock (`Locked`)
    pub fn open(path: &Path) -> StorageResult<Self> {
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path(path))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            temp_path: sibling(path, ".tmp"),
            _lock_file: lock_file,
            write_guard: Mutex::new(()),
        })
    }

    /// Opens a snapshot backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the lock is held.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::open(path)
    }

    /// Returns the path to the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotBackend for FileBackend {
    fn read_all(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, data: &[u8]) -> StorageResult<()> {
        let _guard = self.write_guard.lock();

        let mut file = File::create(&self.temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.temp_path, &self.path)?;
        debug!(path = %self.path.display(), bytes = data.len(), "snapshot written");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Returns the lock file a [`FileBackend`] holds for the snapshot at `path`.
#[must_use]
pub fn lock_path(path: &Path) -> PathBuf {
    sibling(path, ".lock")
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_lock_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        assert!(!lock_path(&path).exists());
        let _backend = FileBackend::open(&path).unwrap();
        assert_eq!(lock_path(&path), dir.path().join("snap.json.lock"));
        assert!(lock_path(&path).exists());
    }

    #[test]
    fn missing_snapshot_reads_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(&dir.path().join("snap.json")).unwrap();
        assert!(!backend.exists());
        assert!(backend.read_all().unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let backend = FileBackend::open(&path).unwrap();

        backend.write_all(b"[1,2,3]").unwrap();
        assert!(backend.exists());
        assert_eq!(backend.read_all().unwrap().unwrap(), b"[1,2,3]");
        assert!(!sibling(&path, ".tmp").exists());
    }

    #[test]
    fn write_replaces_whole_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(&dir.path().join("snap.json")).unwrap();

        backend.write_all(b"a much longer first snapshot").unwrap();
        backend.write_all(b"short").unwrap();
        assert_eq!(backend.read_all().unwrap().unwrap(), b"short");
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");

        {
            let backend = FileBackend::open(&path).unwrap();
            backend.write_all(b"persistent").unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read_all().unwrap().unwrap(), b"persistent");
    }

    #[test]
    fn second_open_is_locked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");

        let _first = FileBackend::open(&path).unwrap();
        let second = FileBackend::open(&path);
        assert!(matches!(second, Err(StorageError::Locked { .. })));
    }

    #[test]
    fn create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("snap.json");

        let backend = FileBackend::open_with_create_dirs(&path).unwrap();
        backend.write_all(b"{}").unwrap();
        assert!(path.exists());
        assert_eq!(backend.path(), path);
    }
}
