//! Row sinks: the external side of the bridge.

use crate::error::{SyncError, SyncResult};
use memstash_core::Document;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// A table-oriented insert capability supplied by the host.
///
/// `table` is the namespace name. Rows never carry the `is_synced` flag.
/// A row may be offered again after a failure, so inserts should be
/// idempotent on the sink side.
pub trait RowSink: Send + Sync {
    /// Inserts one row into `table`.
    ///
    /// # Errors
    ///
    /// Any error leaves the document unsynced; it is offered again on the
    /// next pass.
    fn insert(&self, table: &str, row: &Document) -> SyncResult<()>;
}

impl<S: RowSink + ?Sized> RowSink for Arc<S> {
    fn insert(&self, table: &str, row: &Document) -> SyncResult<()> {
        (**self).insert(table, row)
    }
}

impl<S: RowSink + ?Sized> RowSink for &S {
    fn insert(&self, table: &str, row: &Document) -> SyncResult<()> {
        (**self).insert(table, row)
    }
}

/// In-memory sink that records rows per table.
///
/// Failures can be injected for testing retry behaviour.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<BTreeMap<String, Vec<Document>>>,
    failing_tables: Mutex<HashSet<String>>,
    fail_next: AtomicUsize,
    attempts: AtomicU64,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` inserts fail, whatever the table.
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Makes every insert into `table` fail until cleared.
    pub fn fail_table(&self, table: impl Into<String>) {
        self.failing_tables.lock().insert(table.into());
    }

    /// Removes every injected failure.
    pub fn clear_failures(&self) {
        self.fail_next.store(0, Ordering::SeqCst);
        self.failing_tables.lock().clear();
    }

    /// Returns the rows inserted into `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Document> {
        self.rows.lock().get(table).cloned().unwrap_or_default()
    }

    /// Returns the tables that have received rows.
    pub fn tables(&self) -> Vec<String> {
        self.rows.lock().keys().cloned().collect()
    }

    /// Returns the number of rows inserted across tables.
    pub fn total_rows(&self) -> usize {
        self.rows.lock().values().map(Vec::len).sum()
    }

    /// Returns the number of insert calls, failed ones included.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl RowSink for MemorySink {
    fn insert(&self, table: &str, row: &Document) -> SyncResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(SyncError::sink_retryable(table, "injected failure"));
        }
        if self.failing_tables.lock().contains(table) {
            return Err(SyncError::sink_fatal(table, "table rejects inserts"));
        }
        self.rows
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> Document {
        Document::from([("name", name)])
    }

    #[test]
    fn records_rows_per_table() {
        let sink = MemorySink::new();
        sink.insert("users", &row("Jane")).unwrap();
        sink.insert("users", &row("John")).unwrap();
        sink.insert("orders", &row("o1")).unwrap();

        assert_eq!(sink.rows("users").len(), 2);
        assert_eq!(sink.tables(), vec!["orders", "users"]);
        assert_eq!(sink.total_rows(), 3);
        assert!(sink.rows("missing").is_empty());
    }

    #[test]
    fn fail_next_counts_down() {
        let sink = MemorySink::new();
        sink.fail_next(2);
        assert!(sink.insert("users", &row("a")).is_err());
        assert!(sink.insert("users", &row("a")).is_err());
        sink.insert("users", &row("a")).unwrap();
        assert_eq!(sink.attempts(), 3);
        assert_eq!(sink.total_rows(), 1);
    }

    #[test]
    fn failing_table() {
        let sink = MemorySink::new();
        sink.fail_table("orders");
        let err = sink.insert("orders", &row("o1")).unwrap_err();
        assert!(!err.is_retryable());
        sink.insert("users", &row("a")).unwrap();

        sink.clear_failures();
        sink.insert("orders", &row("o1")).unwrap();
    }

    #[test]
    fn shared_sink_through_arc() {
        let sink = Arc::new(MemorySink::new());
        let dyn_sink: Arc<dyn RowSink> = sink.clone();
        dyn_sink.insert("users", &row("a")).unwrap();
        assert_eq!(sink.total_rows(), 1);
    }
}
