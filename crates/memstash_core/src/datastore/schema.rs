//! Optional per-namespace schemas.

use super::document::{normalize_field, Document};
use crate::error::{CoreError, CoreResult};
use memstash_codec::TypeTag;
use std::collections::BTreeMap;

/// Declared field types for a namespace.
///
/// A schema only constrains the fields it names: a document may omit
/// them or carry extra fields. A declared field holding `null` is a
/// mismatch.
///
/// ```
/// use memstash_codec::TypeTag;
/// use memstash_core::Schema;
///
/// let schema = Schema::new().field("Name", TypeTag::String).field("age", TypeTag::Int);
/// assert_eq!(schema.get("name"), Some(TypeTag::String));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: BTreeMap<String, TypeTag>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field; the name is normalized like document fields.
    #[must_use]
    pub fn field(mut self, name: &str, tag: TypeTag) -> Self {
        self.fields.insert(normalize_field(name), tag);
        self
    }

    /// Builds a schema from `(field, type name)` pairs such as `("age", "int")`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSchema`] for an empty field name or an
    /// unknown type name.
    pub fn from_type_names<I, K, V>(pairs: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut schema = Self::new();
        for (name, type_name) in pairs {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return Err(CoreError::invalid_schema("field name cannot be empty"));
            }
            let tag: TypeTag = type_name
                .as_ref()
                .parse()
                .map_err(|e| CoreError::invalid_schema(format!("field {name}: {e}")))?;
            schema = schema.field(name, tag);
        }
        Ok(schema)
    }

    /// Returns the declared type of a field.
    pub fn get(&self, field: &str) -> Option<TypeTag> {
        self.fields.get(field).copied()
    }

    /// Iterates over declared fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, TypeTag)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks every field present in both the schema and `doc`.
    ///
    /// `doc` must already be normalized.
    pub(crate) fn check(&self, doc: &Document) -> CoreResult<()> {
        for (field, value) in doc {
            let Some(expected) = self.get(field) else {
                continue;
            };
            if value.type_tag() != Some(expected) {
                return Err(CoreError::SchemaTypeMismatch {
                    field: field.clone(),
                    expected: expected.as_str(),
                    actual: value.type_name(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, TypeTag)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, TypeTag)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |schema, (name, tag)| schema.field(&name, tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memstash_codec::Value;

    fn age_schema() -> Schema {
        Schema::new().field("age", TypeTag::Int)
    }

    #[test]
    fn matching_type_passes() {
        let doc = Document::from([("age", 30)]);
        age_schema().check(&doc).unwrap();
    }

    #[test]
    fn mismatch_names_field() {
        let doc = Document::from([("age", "thirty")]);
        let err = age_schema().check(&doc).unwrap_err();
        match err {
            CoreError::SchemaTypeMismatch {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "age");
                assert_eq!(expected, "int");
                assert_eq!(actual, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_is_a_mismatch() {
        let doc = Document::from([("age", Value::Null)]);
        assert!(age_schema().check(&doc).is_err());
    }

    #[test]
    fn undeclared_and_missing_fields_pass() {
        let doc = Document::from([("name", "Jane")]);
        age_schema().check(&doc).unwrap();
    }

    #[test]
    fn from_type_names_parses() {
        let schema = Schema::from_type_names([("Age", "int"), ("name", "string")]).unwrap();
        assert_eq!(schema.get("age"), Some(TypeTag::Int));
        assert_eq!(schema.len(), 2);

        assert!(matches!(
            Schema::from_type_names([("age", "uuid")]),
            Err(CoreError::InvalidSchema { .. })
        ));
        assert!(matches!(
            Schema::from_type_names([("", "int")]),
            Err(CoreError::InvalidSchema { .. })
        ));
    }
}
