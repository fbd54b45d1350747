//! # memstash core
//!
//! Embeddable in-process data engine.
//!
//! This crate provides:
//! - [`KeyStore`], a key/value store with exclusive insert and TTL eviction
//! - [`DataStore`], namespaced documents with optional schemas and
//!   per-field equality indexes
//! - a background sweeper that evicts expired keys and rewrites the
//!   JSON snapshot
//! - the [`DataStore::sync_pending`] boundary used to mirror documents to
//!   an external sink
//!
//! ## Key Invariants
//!
//! - At most one entry per key, for every insert path
//! - After any create, update or delete the index reflects exactly the
//!   current document sequence
//! - One lock guards keys, documents, the sweeper and sync passes
//!
//! ## Example
//!
//! ```rust
//! use memstash_core::{Config, Document, Schema, Store, TypeTag, Value};
//!
//! let store = Store::open(Config::default()).unwrap();
//!
//! let schema = Schema::new().field("age", TypeTag::Int);
//! let users = store.data_store().namespace("user", Some(schema)).unwrap();
//! users
//!     .create(Document::from([("Name", Value::from("Jane")), ("Age", Value::from(30))]))
//!     .unwrap();
//!
//! let found = users.query(&Document::from([("age", 30)]));
//! assert_eq!(found[0].get("name"), Some(&Value::from("Jane")));
//! assert!(!found[0].is_synced());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod datastore;
mod error;
mod keystore;
mod logging;
pub mod snapshot;
mod state;
mod stats;
mod store;
mod sweeper;
mod task;

pub use config::{Config, DEFAULT_SNAPSHOT_PATH, DEFAULT_SWEEP_INTERVAL};
pub use datastore::{
    namespace_name, normalize_field, type_namespace_name, DataStore, Document, Namespace, Schema,
    SyncOutcome, NAMESPACE_FIELD, SYNC_FIELD,
};
pub use error::{CoreError, CoreResult};
pub use keystore::{Entry, KeyEntry, KeyStore};
pub use logging::{init_logging, LogConfig, LogSink};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::Store;
pub use sweeper::SweepReport;
pub use task::PeriodicTask;

pub use memstash_codec::{TypeTag, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
