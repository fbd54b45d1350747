//! Namespace tables: documents, schema and index kept in step.

use super::document::{Document, NAMESPACE_FIELD, SYNC_FIELD};
use super::index::NamespaceIndex;
use super::schema::Schema;
use crate::error::{CoreError, CoreResult};
use memstash_codec::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Storage for one namespace.
#[derive(Debug, Default)]
pub(crate) struct NamespaceData {
    pub(crate) schema: Option<Schema>,
    pub(crate) documents: Vec<Document>,
    index: NamespaceIndex,
}

impl NamespaceData {
    /// Checks normalized fields against the reserved names, the JSON value
    /// model and the schema.
    fn validate(&self, doc: &Document) -> CoreResult<()> {
        if doc.contains_key(NAMESPACE_FIELD) {
            return Err(CoreError::reserved_field(NAMESPACE_FIELD));
        }
        if let Some((field, _)) = doc.iter().find(|(_, value)| has_non_finite(value)) {
            return Err(CoreError::invalid_document(format!(
                "field '{field}' holds a non-finite float"
            )));
        }
        if let Some(schema) = &self.schema {
            schema.check(doc)?;
        }
        Ok(())
    }

    /// Normalizes and validates a document for insertion.
    fn prepare(&self, doc: Document) -> CoreResult<Document> {
        let mut doc = doc.normalized();
        self.validate(&doc)?;
        doc.insert(SYNC_FIELD, false);
        Ok(doc)
    }

    /// Appends a document as-is and indexes it.
    pub(crate) fn push(&mut self, doc: Document) -> usize {
        let position = self.documents.len();
        self.index.insert_document(position, &doc);
        self.documents.push(doc);
        position
    }

    /// Validates and appends one document, returning its position.
    pub(crate) fn insert(&mut self, doc: Document) -> CoreResult<usize> {
        let doc = self.prepare(doc)?;
        Ok(self.push(doc))
    }

    /// Validates every document before appending any of them.
    pub(crate) fn insert_many(&mut self, docs: Vec<Document>) -> CoreResult<usize> {
        let prepared = docs
            .into_iter()
            .map(|doc| self.prepare(doc))
            .collect::<CoreResult<Vec<_>>>()?;
        let count = prepared.len();
        for doc in prepared {
            self.push(doc);
        }
        Ok(count)
    }

    /// Positions of the documents matching every filter field, ascending.
    ///
    /// An empty filter matches everything. A field or value with no index
    /// entry matches nothing.
    pub(crate) fn positions(&self, filters: &Document) -> Vec<usize> {
        if filters.is_empty() {
            return (0..self.documents.len()).collect();
        }
        let mut matched: Option<BTreeSet<usize>> = None;
        for (field, value) in filters {
            let Some(found) = self.index.lookup(field, value) else {
                return Vec::new();
            };
            matched = Some(match matched {
                None => found.clone(),
                Some(acc) => acc.intersection(found).copied().collect(),
            });
            if matched.as_ref().is_some_and(BTreeSet::is_empty) {
                return Vec::new();
            }
        }
        matched.map(|m| m.into_iter().collect()).unwrap_or_default()
    }

    /// Copies of the matching documents in position order.
    pub(crate) fn query(&self, filters: &Document) -> Vec<Document> {
        self.positions(filters)
            .into_iter()
            .map(|p| self.documents[p].clone())
            .collect()
    }

    /// Applies `patch` to every match and rebuilds the index.
    pub(crate) fn update(
        &mut self,
        name: &str,
        filters: &Document,
        patch: Document,
    ) -> CoreResult<usize> {
        if filters.is_empty() {
            return Err(CoreError::FilterRequired);
        }
        let patch = patch.normalized();
        self.validate(&patch)?;
        let positions = self.positions(filters);
        if positions.is_empty() {
            return Err(CoreError::record_not_found(name));
        }
        for &p in &positions {
            let doc = &mut self.documents[p];
            for (field, value) in &patch {
                doc.insert(field.clone(), value.clone());
            }
        }
        self.rebuild_index();
        Ok(positions.len())
    }

    /// Removes every match and rebuilds the index.
    pub(crate) fn delete(&mut self, name: &str, filters: &Document) -> CoreResult<usize> {
        if filters.is_empty() {
            return Err(CoreError::FilterRequired);
        }
        let positions = self.positions(filters);
        if positions.is_empty() {
            return Err(CoreError::record_not_found(name));
        }
        for &p in positions.iter().rev() {
            self.documents.remove(p);
        }
        self.rebuild_index();
        Ok(positions.len())
    }

    /// Sets one field on the document at `position`.
    pub(crate) fn set_field(&mut self, position: usize, field: &str, value: Value) {
        if let Some(doc) = self.documents.get_mut(position) {
            doc.insert(field, value);
        }
    }

    pub(crate) fn rebuild_index(&mut self) {
        self.index.rebuild(&self.documents);
    }

    pub(crate) fn index_len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn unsynced(&self) -> usize {
        self.documents.iter().filter(|d| !d.is_synced()).count()
    }
}

/// Every namespace of a data store, keyed by name.
#[derive(Debug, Default)]
pub(crate) struct DocTable {
    namespaces: BTreeMap<String, NamespaceData>,
}

impl DocTable {
    /// Registers `name` (or re-declares it), replacing its schema and
    /// rebuilding its index from the documents it already holds.
    pub(crate) fn declare(&mut self, name: &str, schema: Option<Schema>) {
        let data = self.namespaces.entry(name.to_string()).or_default();
        data.schema = schema;
        data.rebuild_index();
    }

    /// Returns the namespace, creating it without a schema if needed.
    pub(crate) fn ensure(&mut self, name: &str) -> &mut NamespaceData {
        self.namespaces.entry(name.to_string()).or_default()
    }

    pub(crate) fn get(&self, name: &str) -> CoreResult<&NamespaceData> {
        self.namespaces
            .get(name)
            .ok_or_else(|| CoreError::invalid_namespace(format!("{name} is not declared")))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> CoreResult<&mut NamespaceData> {
        self.namespaces
            .get_mut(name)
            .ok_or_else(|| CoreError::invalid_namespace(format!("{name} is not declared")))
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.namespaces.keys().cloned().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &NamespaceData)> {
        self.namespaces.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut NamespaceData)> {
        self.namespaces.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn document_count(&self) -> usize {
        self.namespaces.values().map(|n| n.documents.len()).sum()
    }
}

fn has_non_finite(value: &Value) -> bool {
    match value {
        Value::Float(x) => !x.is_finite(),
        Value::List(items) => items.iter().any(has_non_finite),
        Value::Map(map) => map.values().any(has_non_finite),
        _ => false,
    }
}
