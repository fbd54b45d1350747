//! Inspect command implementation.

use super::read_snapshot_file;
use memstash_core::snapshot::scan_snapshot;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Snapshot inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Snapshot path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Number of records in the file.
    pub record_count: usize,
    /// Number of records that are not valid documents.
    pub invalid_records: usize,
    /// Per-namespace statistics, sorted by name.
    pub namespaces: Vec<NamespaceStats>,
}

/// Statistics for a single namespace.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct NamespaceStats {
    /// Namespace name.
    pub name: String,
    /// Number of documents.
    pub documents: usize,
    /// Documents already mirrored to a sink.
    pub synced: usize,
    /// Documents waiting to be mirrored.
    pub unsynced: usize,
    /// Distinct field names across documents, bookkeeping field included.
    pub fields: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_snapshot_file(path)?;
    let mut result = analyze(&bytes)?;
    result.path = path.display().to_string();
    result.file_size = bytes.len() as u64;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Computes statistics for snapshot bytes.
pub fn analyze(bytes: &[u8]) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let scan = scan_snapshot(bytes)?;
    let mut namespaces: BTreeMap<String, (NamespaceStats, Vec<String>)> = BTreeMap::new();

    for record in &scan.records {
        let (stats, fields) = namespaces.entry(record.namespace.clone()).or_default();
        stats.documents += 1;
        if record.document.is_synced() {
            stats.synced += 1;
        } else {
            stats.unsynced += 1;
        }
        for (field, _) in &record.document {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
    }

    Ok(InspectResult {
        path: String::new(),
        file_size: bytes.len() as u64,
        record_count: scan.records.len() + scan.problems.len(),
        invalid_records: scan.problems.len(),
        namespaces: namespaces
            .into_iter()
            .map(|(name, (stats, fields))| NamespaceStats {
                name,
                fields: fields.len(),
                ..stats
            })
            .collect(),
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Snapshot: {}", result.path);
    println!();
    println!("File size: {} bytes", result.file_size);
    println!("Records: {}", result.record_count);
    if result.invalid_records > 0 {
        println!("Invalid records: {}", result.invalid_records);
    }
    println!();

    if result.namespaces.is_empty() {
        println!("No namespaces");
        return;
    }

    println!(
        "{:<24} {:>10} {:>10} {:>10} {:>8}",
        "Namespace", "Documents", "Synced", "Unsynced", "Fields"
    );
    for ns in &result.namespaces {
        println!(
            "{:<24} {:>10} {:>10} {:>10} {:>8}",
            ns.name, ns.documents, ns.synced, ns.unsynced, ns.fields
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_namespace() {
        let result = analyze(
            br#"[
                {"_namespace": "users", "name": "Jane", "is_synced": true},
                {"_namespace": "users", "name": "John", "age": 35, "is_synced": false},
                {"_namespace": "orders", "total": 12},
                7
            ]"#,
        )
        .unwrap();

        assert_eq!(result.record_count, 4);
        assert_eq!(result.invalid_records, 1);
        assert_eq!(result.namespaces.len(), 2);
        assert_eq!(
            result.namespaces[1],
            NamespaceStats {
                name: "users".into(),
                documents: 2,
                synced: 1,
                unsynced: 1,
                fields: 3,
            }
        );
        assert_eq!(result.namespaces[0].unsynced, 1);
    }

    #[test]
    fn empty_snapshot() {
        let result = analyze(b"[]").unwrap();
        assert_eq!(result.record_count, 0);
        assert!(result.namespaces.is_empty());
    }
}
