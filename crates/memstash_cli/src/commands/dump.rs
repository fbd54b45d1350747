//! Dump command implementation.

use super::read_snapshot_file;
use memstash_core::snapshot::{decode_snapshot, SnapshotRecord};
use memstash_core::{namespace_name, Value, NAMESPACE_FIELD};
use std::path::Path;

/// Runs the dump command.
pub fn run(
    path: &Path,
    namespace: Option<&str>,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_snapshot_file(path)?;
    let records = select(&bytes, namespace, limit)?;

    match format {
        "json" => {
            let tagged: Vec<Value> = records.into_iter().map(tag).collect();
            let json = memstash_codec::to_json_pretty(&tagged)?;
            println!("{}", String::from_utf8_lossy(&json));
        }
        _ => {
            print_text_output(&records);
        }
    }

    Ok(())
}

/// Decodes a snapshot and keeps the records matching `namespace`, up to `limit`.
///
/// The namespace filter goes through the same name derivation as the
/// store, so `user` selects `users`.
pub fn select(
    bytes: &[u8],
    namespace: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<SnapshotRecord>, Box<dyn std::error::Error>> {
    let wanted = namespace.map(namespace_name).transpose()?;
    let records = decode_snapshot(bytes)?
        .into_iter()
        .filter(|r| wanted.as_ref().map_or(true, |w| *w == r.namespace))
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    Ok(records)
}

fn tag(record: SnapshotRecord) -> Value {
    let mut doc = record.document;
    doc.insert(NAMESPACE_FIELD, record.namespace);
    Value::from(doc)
}

fn print_text_output(records: &[SnapshotRecord]) {
    if records.is_empty() {
        println!("No documents");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        let synced = if record.document.is_synced() { "synced" } else { "pending" };
        let body = Value::from(record.document.without_sync_flag());
        println!("[{i:>5}] {:<16} {:<8} {body}", record.namespace, synced);
    }
    println!();
    println!("{} document(s)", records.len());
}
