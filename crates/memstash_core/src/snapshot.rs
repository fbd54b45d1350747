//! JSON snapshot format.
//!
//! A snapshot is one JSON array holding every document of every namespace.
//! Each element is a flat object carrying its namespace name under the
//! reserved `_namespace` field:
//!
//! ```json
//! [
//!   {"_namespace": "users", "name": "Jane", "age": 30, "is_synced": false}
//! ]
//! ```
//!
//! A file holding a single object instead of an array is accepted on read.

use crate::datastore::{DocTable, Document, NAMESPACE_FIELD, SYNC_FIELD};
use crate::error::{CoreError, CoreResult};
use crate::state::Shared;
use memstash_codec::Value;
use memstash_storage::SnapshotBackend;
use tracing::{debug, info};

/// One document read from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    /// Namespace the document belongs to.
    pub namespace: String,
    /// The document, without the namespace tag.
    pub document: Document,
}

/// A record that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotProblem {
    /// Position of the record in the file.
    pub index: usize,
    /// What is wrong with it.
    pub message: String,
}

/// Result of a lenient snapshot read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotScan {
    /// Records that were read successfully.
    pub records: Vec<SnapshotRecord>,
    /// Records that were skipped.
    pub problems: Vec<SnapshotProblem>,
}

/// Encodes every document of `docs` as a snapshot.
pub(crate) fn encode_snapshot(docs: &DocTable) -> CoreResult<Vec<u8>> {
    let records: Vec<Value> = docs
        .iter()
        .flat_map(|(name, ns)| {
            ns.documents.iter().map(move |doc| {
                let mut tagged = doc.clone();
                tagged.insert(NAMESPACE_FIELD, name);
                Value::from(tagged)
            })
        })
        .collect();
    Ok(memstash_codec::to_json_pretty(&records)?)
}

/// Reads a snapshot, skipping malformed records.
///
/// # Errors
///
/// Returns [`CoreError::Codec`] if the bytes are not JSON and
/// [`CoreError::InvalidDocument`] if the top level is neither an array nor
/// an object.
pub fn scan_snapshot(bytes: &[u8]) -> CoreResult<SnapshotScan> {
    let items = match memstash_codec::from_json::<Value>(bytes)? {
        Value::List(items) => items,
        map @ Value::Map(_) => vec![map],
        other => {
            return Err(CoreError::invalid_document(format!(
                "snapshot must be an array or object, got {}",
                other.type_name()
            )))
        }
    };

    let mut scan = SnapshotScan::default();
    for (index, item) in items.into_iter().enumerate() {
        match record_from_value(item) {
            Ok(record) => scan.records.push(record),
            Err(message) => scan.problems.push(SnapshotProblem { index, message }),
        }
    }
    Ok(scan)
}

/// Reads a snapshot, failing on the first malformed record.
///
/// # Errors
///
/// As [`scan_snapshot`], plus [`CoreError::InvalidDocument`] naming the
/// first bad record.
pub fn decode_snapshot(bytes: &[u8]) -> CoreResult<Vec<SnapshotRecord>> {
    let scan = scan_snapshot(bytes)?;
    match scan.problems.into_iter().next() {
        Some(p) => Err(CoreError::invalid_document(format!(
            "record {}: {}",
            p.index, p.message
        ))),
        None => Ok(scan.records),
    }
}

fn record_from_value(item: Value) -> Result<SnapshotRecord, String> {
    let mut document = match item {
        Value::Map(fields) => Document::from(fields),
        other => return Err(format!("expected object, got {}", other.type_name())),
    };
    let namespace = match document.remove(NAMESPACE_FIELD) {
        Some(Value::Text(name)) if !name.trim().is_empty() => name,
        Some(Value::Text(_)) => return Err(format!("{NAMESPACE_FIELD} is empty")),
        Some(other) => {
            return Err(format!(
                "{NAMESPACE_FIELD} must be a string, got {}",
                other.type_name()
            ))
        }
        None => return Err(format!("missing {NAMESPACE_FIELD}")),
    };
    if !matches!(document.get(SYNC_FIELD), Some(Value::Bool(_))) {
        document.insert(SYNC_FIELD, false);
    }
    Ok(SnapshotRecord {
        namespace,
        document,
    })
}

/// Appends records to their namespaces, creating namespaces as needed.
///
/// Returns the number of documents loaded.
pub(crate) fn load_records(docs: &mut DocTable, records: Vec<SnapshotRecord>) -> usize {
    let count = records.len();
    for record in records {
        docs.ensure(&record.namespace).push(record.document);
    }
    count
}

/// Writes every document of the store to `backend`, returning how many.
///
/// The document tables are encoded under the read lock; the write itself
/// happens after the lock is released.
pub(crate) fn write_snapshot(shared: &Shared, backend: &dyn SnapshotBackend) -> CoreResult<usize> {
    let _ordered = shared.snapshot_lock.lock();
    let (bytes, count) = {
        let state = shared.state.read();
        (encode_snapshot(&state.docs)?, state.docs.document_count())
    };
    let result = backend.write_all(&bytes);
    shared.stats.record_snapshot(result.is_ok());
    result?;
    debug!(documents = count, bytes = bytes.len(), "snapshot written");
    Ok(count)
}

/// Appends the documents held by `backend` to the store.
///
/// A backend with no snapshot yet loads nothing.
pub(crate) fn read_snapshot(shared: &Shared, backend: &dyn SnapshotBackend) -> CoreResult<usize> {
    let Some(bytes) = backend.read_all()? else {
        return Ok(0);
    };
    let records = decode_snapshot(&bytes)?;
    let count = load_records(&mut shared.state.write().docs, records);
    info!(documents = count, "snapshot loaded");
    Ok(count)
}
