//! Verify command implementation.

use super::read_snapshot_file;
use memstash_core::snapshot::scan_snapshot;
use memstash_core::{namespace_name, normalize_field};
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of records checked.
    pub records_checked: usize,
    /// Number of valid records.
    pub valid_records: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying snapshot at {}", path.display());
    println!();

    let bytes = read_snapshot_file(path)?;
    let result = verify(&bytes);
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Snapshot verification passed");
        Ok(())
    } else {
        println!("✗ Snapshot verification failed");
        Err("Verification failed".into())
    }
}

/// Checks every record of a snapshot.
///
/// Records must be objects tagged with a string namespace. A tagged
/// document is also flagged when its namespace or field names are not in
/// the form the store writes.
pub fn verify(bytes: &[u8]) -> VerifyResult {
    let mut result = VerifyResult::default();
    let scan = match scan_snapshot(bytes) {
        Ok(scan) => scan,
        Err(e) => {
            result.errors.push(format!("Unreadable snapshot: {e}"));
            return result;
        }
    };

    result.records_checked = scan.records.len() + scan.problems.len();
    for problem in &scan.problems {
        result
            .errors
            .push(format!("Record {}: {}", problem.index, problem.message));
    }

    for record in &scan.records {
        let mut valid = true;
        match namespace_name(&record.namespace) {
            Ok(name) if name == record.namespace => {}
            _ => {
                result.errors.push(format!(
                    "Namespace {:?} is not a normalized namespace name",
                    record.namespace
                ));
                valid = false;
            }
        }
        for (field, _) in &record.document {
            if normalize_field(field) != *field {
                result.errors.push(format!(
                    "Field {field:?} in namespace {} is not normalized",
                    record.namespace
                ));
                valid = false;
            }
        }
        if valid {
            result.valid_records += 1;
        }
    }

    result
}

fn print_result(result: &VerifyResult) {
    println!("  Records checked: {}", result.records_checked);
    println!("  Valid records: {}", result.valid_records);
    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in &result.errors {
            println!("    - {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_snapshot_passes() {
        let result = verify(br#"[{"_namespace": "users", "name": "Jane", "is_synced": false}]"#);
        assert!(result.is_ok());
        assert_eq!(result.records_checked, 1);
        assert_eq!(result.valid_records, 1);
    }

    #[test]
    fn reports_every_problem() {
        let result = verify(
            br#"[
                {"name": "untagged"},
                {"_namespace": "User", "name": "x"},
                {"_namespace": "users", "FirstName": "x"},
                "text"
            ]"#,
        );
        assert!(!result.is_ok());
        assert_eq!(result.records_checked, 4);
        assert_eq!(result.valid_records, 0);
        assert_eq!(result.errors.len(), 4);
    }

    #[test]
    fn unreadable_snapshot_fails() {
        let result = verify(b"{not json");
        assert!(!result.is_ok());
        assert_eq!(result.records_checked, 0);
    }
}
