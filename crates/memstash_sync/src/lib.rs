//! # memstash sync
//!
//! Mirrors memstash documents into an external, table-oriented sink.
//!
//! This crate provides:
//! - [`RowSink`], the insert capability a host implements for its database
//! - [`MemorySink`], a recording sink with failure injection for tests
//! - [`SyncBridge`], a background task that pushes unsynced documents on a
//!   fixed interval
//!
//! ## Delivery
//!
//! Each document is inserted into the table named after its namespace,
//! without its `is_synced` flag. Delivery is at-least-once: a failed row is
//! retried on every pass until it succeeds, so the sink must tolerate
//! repeats.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod config;
mod error;
mod sink;

pub use bridge::{SyncBridge, SyncStats};
pub use config::{SyncConfig, DEFAULT_SYNC_INTERVAL};
pub use error::{SyncError, SyncResult};
pub use sink::{MemorySink, RowSink};

pub use memstash_core::SyncOutcome;
