//! Per-namespace equality index.

use super::document::Document;
use memstash_codec::{IndexKey, Value};
use std::collections::{BTreeSet, HashMap};

/// Maps each field value to the positions of the documents holding it.
///
/// Positions are indexes into the namespace's document sequence. The
/// index is rebuilt from scratch after any update or delete, since removals
/// shift positions.
#[derive(Debug, Default)]
pub(crate) struct NamespaceIndex {
    fields: HashMap<String, HashMap<IndexKey, BTreeSet<usize>>>,
}

impl NamespaceIndex {
    /// Indexes every indexable field of the document at `position`.
    ///
    /// Fields holding lists, maps or NaN are skipped.
    pub(crate) fn insert_document(&mut self, position: usize, doc: &Document) {
        for (field, value) in doc {
            if let Some(key) = IndexKey::from_value(value) {
                self.fields
                    .entry(field.clone())
                    .or_default()
                    .entry(key)
                    .or_default()
                    .insert(position);
            }
        }
    }

    /// Discards all entries and reindexes `documents`.
    pub(crate) fn rebuild(&mut self, documents: &[Document]) {
        self.clear();
        for (position, doc) in documents.iter().enumerate() {
            self.insert_document(position, doc);
        }
    }

    /// Returns the positions holding `value` in `field`.
    pub(crate) fn lookup(&self, field: &str, value: &Value) -> Option<&BTreeSet<usize>> {
        let key = IndexKey::from_value(value)?;
        self.fields.get(field)?.get(&key)
    }

    pub(crate) fn clear(&mut self) {
        self.fields.clear();
    }

    /// Total number of (value, position) entries.
    pub(crate) fn len(&self) -> usize {
        self.fields
            .values()
            .flat_map(HashMap::values)
            .map(BTreeSet::len)
            .sum()
    }
}
