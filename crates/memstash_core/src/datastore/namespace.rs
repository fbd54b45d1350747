//! Namespace handles and name derivation.

use super::document::Document;
use super::schema::Schema;
use crate::error::{CoreError, CoreResult};
use crate::state::Shared;
use memstash_codec::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Derives a namespace name from a raw identifier.
///
/// The name is trimmed and lowercased, and an `s` is appended unless it
/// already ends in one: `"User"` becomes `"users"`, `"atlas"` stays `"atlas"`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidNamespace`] if the identifier is blank.
pub fn namespace_name(raw: &str) -> CoreResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_namespace("namespace name cannot be empty"));
    }
    let mut name = trimmed.to_lowercase();
    if !name.ends_with('s') {
        name.push('s');
    }
    Ok(name)
}

/// Derives a namespace name from a Rust type.
///
/// Uses the last path segment of the type name with generic arguments
/// stripped, so `app::models::User` maps to `"users"`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidNamespace`] if no usable name remains.
pub fn type_namespace_name<T: ?Sized>() -> CoreResult<String> {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let last = base.rsplit("::").next().unwrap_or(base);
    if !last.chars().next().is_some_and(char::is_alphabetic) {
        return Err(CoreError::invalid_namespace(format!(
            "type {full} has no usable name"
        )));
    }
    namespace_name(last)
}

/// Handle to one namespace of a [`DataStore`](super::DataStore).
///
/// Filters and patches are documents; their field names are normalized
/// before use. Multi-field filters match documents satisfying every field.
#[derive(Clone)]
pub struct Namespace {
    shared: Arc<Shared>,
    name: String,
}

impl Namespace {
    pub(crate) fn new(shared: Arc<Shared>, name: String) -> Self {
        Self { shared, name }
    }

    /// Returns the namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema currently registered for this namespace.
    pub fn schema(&self) -> Option<Schema> {
        let state = self.shared.state.read();
        state.docs.get(&self.name).ok().and_then(|ns| ns.schema.clone())
    }

    /// Validates and appends a document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaTypeMismatch`] if a field disagrees with
    /// the schema, or [`CoreError::ReservedField`] for `_namespace`.
    pub fn create(&self, doc: impl Into<Document>) -> CoreResult<()> {
        let mut state = self.shared.state.write();
        let position = state.docs.get_mut(&self.name)?.insert(doc.into())?;
        self.shared.stats.record_documents_created(1);
        debug!(namespace = %self.name, position, "document created");
        Ok(())
    }

    /// Appends any serializable record, typically a struct.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create), plus [`CoreError::InvalidDocument`] if the
    /// record does not serialize to a map.
    pub fn create_from<T: Serialize + ?Sized>(&self, record: &T) -> CoreResult<()> {
        self.create(Document::from_serialize(record)?)
    }

    /// Validates every document, then appends them all.
    ///
    /// Nothing is appended if any document is rejected.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create).
    pub fn create_many<I>(&self, docs: I) -> CoreResult<usize>
    where
        I: IntoIterator,
        I::Item: Into<Document>,
    {
        let docs: Vec<Document> = docs.into_iter().map(Into::into).collect();
        let mut state = self.shared.state.write();
        let count = state.docs.get_mut(&self.name)?.insert_many(docs)?;
        self.shared.stats.record_documents_created(count as u64);
        debug!(namespace = %self.name, count, "documents created");
        Ok(count)
    }

    /// Appends the documents held in a JSON file.
    ///
    /// The file holds either one object or an array of objects.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file cannot be read,
    /// [`CoreError::Codec`] if it is not JSON, or
    /// [`CoreError::InvalidDocument`] if the top level is neither shape.
    pub fn import_json_file(&self, path: impl AsRef<Path>) -> CoreResult<usize> {
        let bytes = std::fs::read(path.as_ref())?;
        let docs = match memstash_codec::from_json::<Value>(&bytes)? {
            Value::Map(fields) => vec![Document::from(fields)],
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Map(fields) => Ok(Document::from(fields)),
                    other => Err(CoreError::invalid_document(format!(
                        "element {i} is {}, expected map",
                        other.type_name()
                    ))),
                })
                .collect::<CoreResult<Vec<_>>>()?,
            other => {
                return Err(CoreError::invalid_document(format!(
                    "expected an object or array, got {}",
                    other.type_name()
                )))
            }
        };
        self.create_many(docs)
    }

    /// Returns copies of the matching documents in insertion order.
    ///
    /// An empty filter returns every document.
    pub fn query(&self, filters: &Document) -> Vec<Document> {
        let filters = filters.clone().normalized();
        self.shared.stats.record_query();
        let state = self.shared.state.read();
        state
            .docs
            .get(&self.name)
            .map(|ns| ns.query(&filters))
            .unwrap_or_default()
    }

    /// Queries and decodes every match into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Codec`] if a document does not decode.
    pub fn find<T: DeserializeOwned>(&self, filters: &Document) -> CoreResult<Vec<T>> {
        self.query(filters)
            .iter()
            .map(|doc| memstash_codec::decode_as(doc).map_err(CoreError::from))
            .collect()
    }

    /// Decodes the single document matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RecordNotFound`] on no match and
    /// [`CoreError::TooManyResults`] on more than one.
    pub fn first<T: DeserializeOwned>(&self, filters: &Document) -> CoreResult<T> {
        let mut found = self.query(filters);
        match found.len() {
            0 => Err(CoreError::record_not_found(&self.name)),
            1 => {
                let doc = found.remove(0);
                Ok(memstash_codec::decode_as(&doc)?)
            }
            count => Err(CoreError::TooManyResults { count }),
        }
    }

    /// Applies `patch` to every match, returning how many were updated.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FilterRequired`] for an empty filter,
    /// [`CoreError::RecordNotFound`] when nothing matches, and the schema
    /// errors of [`create`](Self::create) for the patch.
    pub fn update(&self, filters: &Document, patch: impl Into<Document>) -> CoreResult<usize> {
        let filters = filters.clone().normalized();
        let mut state = self.shared.state.write();
        let count = state
            .docs
            .get_mut(&self.name)?
            .update(&self.name, &filters, patch.into())?;
        self.shared.stats.record_documents_updated(count as u64);
        debug!(namespace = %self.name, count, "documents updated");
        Ok(count)
    }

    /// Removes every match, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FilterRequired`] for an empty filter and
    /// [`CoreError::RecordNotFound`] when nothing matches.
    pub fn delete(&self, filters: &Document) -> CoreResult<usize> {
        let filters = filters.clone().normalized();
        let mut state = self.shared.state.write();
        let count = state.docs.get_mut(&self.name)?.delete(&self.name, &filters)?;
        self.shared.stats.record_documents_deleted(count as u64);
        debug!(namespace = %self.name, count, "documents deleted");
        Ok(count)
    }

    /// Returns the number of documents.
    pub fn count(&self) -> usize {
        let state = self.shared.state.read();
        state.docs.get(&self.name).map_or(0, |ns| ns.documents.len())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace").field("name", &self.name).finish()
    }
}
