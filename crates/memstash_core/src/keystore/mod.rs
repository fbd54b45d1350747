//! Time-bounded key/value store.

mod entry;
mod store;
mod table;

pub use entry::{Entry, KeyEntry};
pub use store::KeyStore;
pub(crate) use table::KeyTable;
