//! Closed set of type tags used by schemas.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The type of a field as declared in a schema.
///
/// Schemas are expressed against this closed enum instead of host runtime
/// type names, so a declaration means the same thing everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// UTF-8 text.
    String,
    /// Signed 64-bit integer.
    Int,
    /// Double precision float.
    Float,
    /// Boolean.
    Bool,
    /// List of values.
    List,
    /// Map of string keys to values.
    Map,
}

impl TypeTag {
    /// All tags, in declaration order.
    pub const ALL: [TypeTag; 6] = [
        TypeTag::String,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Bool,
        TypeTag::List,
        TypeTag::Map,
    ];

    /// Returns the canonical name of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::List => "list",
            TypeTag::Map => "map",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Ok(TypeTag::String),
            "int" | "integer" | "i64" => Ok(TypeTag::Int),
            "float" | "f64" | "double" => Ok(TypeTag::Float),
            "bool" | "boolean" => Ok(TypeTag::Bool),
            "list" | "array" => Ok(TypeTag::List),
            "map" | "object" => Ok(TypeTag::Map),
            _ => Err(CodecError::unknown_type(s)),
        }
    }
}
