//! Error types for memstash core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in memstash core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Snapshot storage error.
    #[error("storage error: {0}")]
    Storage(#[from] memstash_storage::StorageError),

    /// JSON codec error.
    #[error("codec error: {0}")]
    Codec(#[from] memstash_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No entry holds the key.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// An entry already holds the key.
    #[error("key already exists: {key}")]
    KeyExists {
        /// The duplicated key.
        key: String,
    },

    /// A document field disagrees with the namespace schema.
    #[error("invalid type for field {field}: expected {expected}, got {actual}")]
    SchemaTypeMismatch {
        /// The normalized field name.
        field: String,
        /// The type declared by the schema.
        expected: &'static str,
        /// The runtime type of the value.
        actual: &'static str,
    },

    /// The operation needs a non-empty filter.
    #[error("filter params cannot be empty")]
    FilterRequired,

    /// No document matched the filter.
    #[error("record not found in namespace {namespace}")]
    RecordNotFound {
        /// The namespace searched.
        namespace: String,
    },

    /// More than one document matched where exactly one was expected.
    #[error("expected one result, but got {count}; use find for multiple results")]
    TooManyResults {
        /// Number of matching documents.
        count: usize,
    },

    /// The namespace identifier is empty or malformed.
    #[error("invalid namespace: {message}")]
    InvalidNamespace {
        /// Description of the problem.
        message: String,
    },

    /// The schema declaration is malformed.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Description of the problem.
        message: String,
    },

    /// A document used a field name the engine reserves.
    #[error("field {field} is reserved")]
    ReservedField {
        /// The reserved field name.
        field: String,
    },

    /// A document or snapshot record has the wrong shape.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of the problem.
        message: String,
    },

    /// The store configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates a key not found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Creates a key exists error.
    pub fn key_exists(key: impl Into<String>) -> Self {
        Self::KeyExists { key: key.into() }
    }

    /// Creates a record not found error.
    pub fn record_not_found(namespace: impl Into<String>) -> Self {
        Self::RecordNotFound {
            namespace: namespace.into(),
        }
    }

    /// Creates an invalid namespace error.
    pub fn invalid_namespace(message: impl Into<String>) -> Self {
        Self::InvalidNamespace {
            message: message.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a reserved field error.
    pub fn reserved_field(field: impl Into<String>) -> Self {
        Self::ReservedField {
            field: field.into(),
        }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true for the "nothing there" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. } | Self::RecordNotFound { .. })
    }
}
