//! Documents and field name normalization.

use crate::error::{CoreError, CoreResult};
use memstash_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Bookkeeping flag attached to every stored document.
pub const SYNC_FIELD: &str = "is_synced";

/// Field tagging each record with its namespace in snapshot files.
pub const NAMESPACE_FIELD: &str = "_namespace";

/// Normalizes a field name to its canonical snake case form.
///
/// Every ASCII uppercase letter after the first character gets an
/// underscore in front of it, then the whole name is lowercased (Unicode
/// aware): `"Name"` becomes `"name"`, `"isSynced"` becomes `"is_synced"`
/// and `"Ñame"` becomes `"ñame"`.
pub fn normalize_field(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c);
    }
    out.to_lowercase()
}

/// A mapping of field names to values belonging to one namespace.
///
/// Documents are also used as filters and patches. The store normalizes
/// field names on the way in, so callers may use either `"Age"` or `"age"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from any serializable record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDocument`] if the record does not
    /// serialize to a map.
    pub fn from_serialize<T: Serialize + ?Sized>(record: &T) -> CoreResult<Self> {
        match memstash_codec::to_value(record)? {
            Value::Map(fields) => Ok(Self { fields }),
            other => Err(CoreError::invalid_document(format!(
                "expected a map, got {}",
                other.type_name()
            ))),
        }
    }

    /// Returns the value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Removes a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns true if the field is present.
    pub fn contains_key(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the sync flag; absent means not synced.
    pub fn is_synced(&self) -> bool {
        self.get(SYNC_FIELD).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns a copy without the sync bookkeeping field.
    pub fn without_sync_flag(&self) -> Document {
        let mut copy = self.clone();
        copy.remove(SYNC_FIELD);
        copy
    }

    /// Consumes the document, returning its fields.
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.fields
    }

    /// Returns the document with every field name normalized.
    ///
    /// When two names collapse onto one (`"Age"` and `"age"`), the one
    /// sorting last wins.
    pub(crate) fn normalized(self) -> Document {
        self.fields
            .into_iter()
            .map(|(k, v)| (normalize_field(&k), v))
            .collect()
    }
}

impl From<BTreeMap<String, Value>> for Document {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Map(doc.fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Document {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_names() {
        assert_eq!(normalize_field("Name"), "name");
        assert_eq!(normalize_field("isSynced"), "is_synced");
        assert_eq!(normalize_field("FirstName"), "first_name");
        assert_eq!(normalize_field("already_snake"), "already_snake");
        assert_eq!(normalize_field(""), "");
    }

    #[test]
    fn normalize_lowercases_non_ascii() {
        assert_eq!(normalize_field("Ñame"), "ñame");
        assert_eq!(normalize_field("fooÉtat"), "fooétat");
        assert_eq!(normalize_field("StraßeName"), "straße_name");
    }

    #[test]
    fn normalized_document() {
        let doc = Document::from([("Name", Value::from("Jane")), ("Age", Value::from(30))]);
        let doc = doc.normalized();
        assert_eq!(doc.get("name"), Some(&Value::from("Jane")));
        assert_eq!(doc.get("age"), Some(&Value::from(30)));
        assert!(!doc.contains_key("Name"));
    }

    #[test]
    fn sync_flag_defaults_false() {
        let mut doc = Document::new();
        assert!(!doc.is_synced());
        doc.insert(SYNC_FIELD, true);
        assert!(doc.is_synced());
        assert!(!doc.without_sync_flag().contains_key(SYNC_FIELD));
    }

    #[test]
    fn from_struct() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
            age: u8,
        }
        let doc = Document::from_serialize(&User { name: "Jane", age: 30 }).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("age"), Some(&Value::from(30)));

        assert!(matches!(
            Document::from_serialize(&5),
            Err(CoreError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn json_shape_is_flat_object() {
        let doc = Document::from([("a", 1)]);
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":1}"#);
    }
}
