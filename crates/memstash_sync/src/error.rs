//! Error types for the sync bridge.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while mirroring documents.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The sink failed to insert a row.
    #[error("sink error on table {table}: {message}")]
    Sink {
        /// Target table.
        table: String,
        /// Error message.
        message: String,
        /// Whether the insert may succeed if retried.
        retryable: bool,
    },

    /// The sink is not accepting rows.
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] memstash_core::CoreError),

    /// The background task could not be started.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bridge configuration is unusable.
    #[error("invalid sync configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Creates a retryable sink error.
    pub fn sink_retryable(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            table: table.into(),
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable sink error.
    pub fn sink_fatal(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            table: table.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    ///
    /// The bridge retries every failed row on the next pass regardless;
    /// this only informs logging.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Sink { retryable, .. } => *retryable,
            SyncError::Unavailable(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::sink_retryable("users", "deadlock").is_retryable());
        assert!(!SyncError::sink_fatal("users", "no such table").is_retryable());
        assert!(SyncError::Unavailable("down".into()).is_retryable());
        assert!(!SyncError::InvalidConfig("zero".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::sink_fatal("users", "no such table");
        assert_eq!(err.to_string(), "sink error on table users: no such table");
    }
}
