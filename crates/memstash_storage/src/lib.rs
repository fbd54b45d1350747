//! # memstash storage
//!
//! Snapshot backends for memstash.
//!
//! Backends are **opaque whole-file stores**: a snapshot is always written
//! in one piece, replacing the previous one, and always read back in one
//! piece. They do not interpret the bytes they hold; the snapshot format
//! belongs to `memstash_core`.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For snapshots on disk, guarded by an advisory lock
//!
//! ## Example
//!
//! ```rust
//! use memstash_storage::{InMemoryBackend, SnapshotBackend};
//!
//! let backend = InMemoryBackend::new();
//! assert!(backend.read_all().unwrap().is_none());
//! backend.write_all(b"[]").unwrap();
//! assert_eq!(backend.read_all().unwrap().as_deref(), Some(&b"[]"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::SnapshotBackend;
pub use error::{StorageError, StorageResult};
pub use file::{lock_path, FileBackend};
pub use memory::InMemoryBackend;
