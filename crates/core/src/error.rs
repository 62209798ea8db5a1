//! Error types for keyrow
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::key::CompositePrimaryKey;
use thiserror::Error;

/// Result type alias for keyrow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the typed table layer
#[derive(Debug, Error)]
pub enum Error {
    /// A single conditional write lost a race or its precondition did not
    /// hold: row missing on update, row present on insert, or a version
    /// mismatch on update/delete. Recoverable by re-reading and retrying
    /// at a higher layer.
    #[error("conditional check failed for ({partition_key}, {sort_key}): {message}")]
    ConditionalCheckFailed {
        /// Partition key of the contested row
        partition_key: String,
        /// Sort key of the contested row
        sort_key: String,
        /// What precondition failed
        message: String,
    },

    /// Retry budget exhausted while the row stayed contended. Distinct from
    /// [`Error::ConditionalCheckFailed`] so callers can tell "still
    /// contended" from "gave up".
    #[error("concurrency retries exhausted for ({partition_key}, {sort_key}): {message}")]
    Concurrency {
        /// Partition key of the contested row
        partition_key: String,
        /// Sort key of the contested row
        sort_key: String,
        /// Context for the exhausted operation
        message: String,
    },

    /// A decode or payload replacement was attempted with an incompatible
    /// type. Not retryable; indicates programmer error or data corruption.
    #[error("type mismatch: expected {expected}, provided {provided}")]
    TypeMismatch {
        /// The type that was expected
        expected: String,
        /// The type that was actually present
        provided: String,
    },

    /// A stored row discriminator was not present in the caller's registry.
    /// Not retryable.
    #[error("unexpected row type: {provided}")]
    UnexpectedRowType {
        /// The discriminator that could not be resolved
        provided: String,
    },

    /// Payload serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all for backing-store failures not covered above; propagated,
    /// never retried by this layer.
    #[error("database error: {reason}")]
    Database {
        /// Description of the backing-store failure
        reason: String,
    },
}

impl Error {
    /// Build a [`Error::ConditionalCheckFailed`] for a key
    pub fn conditional_check_failed(
        key: &CompositePrimaryKey,
        message: impl Into<String>,
    ) -> Self {
        Error::ConditionalCheckFailed {
            partition_key: key.partition_key.clone(),
            sort_key: key.sort_key.clone(),
            message: message.into(),
        }
    }

    /// Build a [`Error::Concurrency`] for a key
    pub fn concurrency(key: &CompositePrimaryKey, message: impl Into<String>) -> Self {
        Error::Concurrency {
            partition_key: key.partition_key.clone(),
            sort_key: key.sort_key.clone(),
            message: message.into(),
        }
    }

    /// Build a [`Error::Database`] from a reason
    pub fn database(reason: impl Into<String>) -> Self {
        Error::Database {
            reason: reason.into(),
        }
    }

    /// Whether this error is a single-attempt conditional conflict
    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, Error::ConditionalCheckFailed { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
