//! CLI command implementations.

pub mod dump;
pub mod inspect;
pub mod verify;

use memstash_storage::{lock_path, FileBackend, SnapshotBackend};
use std::path::Path;
use tracing::debug;

/// Reads a snapshot file.
///
/// When a lock file sits next to the snapshot, the read goes through the
/// locking file backend and fails while a running store holds it. Without
/// one the file is read directly, so nothing is created next to it.
pub fn read_snapshot_file(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let missing = || format!("No snapshot found at {}", path.display());
    if !path.is_file() {
        return Err(missing().into());
    }
    let bytes = if lock_path(path).exists() {
        FileBackend::open(path)?.read_all()?.ok_or_else(missing)?
    } else {
        std::fs::read(path)?
    };
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot read");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = read_snapshot_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("No snapshot found"));
    }

    #[test]
    fn reads_snapshot_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memstash.json");
        std::fs::write(&path, b"[]").unwrap();
        assert_eq!(read_snapshot_file(&path).unwrap(), b"[]".to_vec());
    }

    #[test]
    fn unlocked_read_leaves_no_lock_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memstash.json");
        std::fs::write(&path, b"[]").unwrap();
        read_snapshot_file(&path).unwrap();
        assert!(!lock_path(&path).exists());
    }

    #[test]
    fn released_lock_file_is_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memstash.json");
        std::fs::write(&path, b"[1]").unwrap();
        drop(FileBackend::open(&path).unwrap());
        assert_eq!(read_snapshot_file(&path).unwrap(), b"[1]".to_vec());
    }

    #[test]
    fn held_snapshot_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memstash.json");
        std::fs::write(&path, b"[]").unwrap();
        let _holder = FileBackend::open(&path).unwrap();
        assert!(read_snapshot_file(&path).is_err());
    }
}
