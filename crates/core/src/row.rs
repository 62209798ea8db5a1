//! Versioned row contract types
//!
//! The fundamental persisted unit is a [`TypedRow`]: a composite key, an
//! immutable creation timestamp, a [`RowStatus`] (version counter plus
//! last-updated timestamp), and a typed payload.
//!
//! ## Lifecycle
//!
//! Rows are created via [`TypedRow::new_item`] at version 1 and mutated
//! only by producing a *new* immutable value with
//! [`TypedRow::create_updated_item`], which bumps the version by exactly 1
//! and refreshes `last_updated` while copying `create_date` unchanged. The
//! table layer never mutates a row in place.

use crate::key::CompositePrimaryKey;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Storage-level version metadata for a row
///
/// ## Invariants
///
/// - `row_version` starts at 1 for a brand-new row
/// - `row_version` increases by exactly 1 on every successful mutating
///   write to a given key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowStatus {
    /// Monotonically increasing version counter
    pub row_version: u64,
    /// When this version was written
    pub last_updated: Timestamp,
}

/// A typed row with its version metadata
///
/// Value type; callers copy it freely. The only shared mutable state
/// between concurrent callers is the backing store itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedRow<T> {
    /// The row's composite primary key
    pub key: CompositePrimaryKey,
    /// Set once at creation, copied unchanged through every update
    pub create_date: Timestamp,
    /// Storage-level version metadata
    pub status: RowStatus,
    /// The typed payload
    pub row_value: T,
}

impl<T> TypedRow<T> {
    /// Create a brand-new row at version 1
    pub fn new_item(key: CompositePrimaryKey, row_value: T) -> Self {
        let now = Timestamp::now();
        TypedRow {
            key,
            create_date: now,
            status: RowStatus {
                row_version: 1,
                last_updated: now,
            },
            row_value,
        }
    }

    /// Produce the successor row for a conditional update
    ///
    /// The new row carries `row_version + 1`, a fresh `last_updated`, the
    /// same key, and the original `create_date`. The caller passes the
    /// result as `new_item` to `update_item` together with this row as
    /// `existing_item`.
    pub fn create_updated_item(&self, new_value: T) -> TypedRow<T> {
        TypedRow {
            key: self.key.clone(),
            create_date: self.create_date,
            status: RowStatus {
                row_version: self.status.row_version + 1,
                last_updated: Timestamp::now(),
            },
            row_value: new_value,
        }
    }

    /// The current storage-level version
    #[inline]
    pub fn row_version(&self) -> u64 {
        self.status.row_version
    }

    /// Get a reference to the payload
    #[inline]
    pub fn value(&self) -> &T {
        &self.row_value
    }

    /// Consume and return the payload
    #[inline]
    pub fn into_value(self) -> T {
        self.row_value
    }

    /// Map the payload to a new type, keeping key and status
    pub fn map<U, F>(self, f: F) -> TypedRow<U>
    where
        F: FnOnce(T) -> U,
    {
        TypedRow {
            key: self.key,
            create_date: self.create_date,
            status: self.status,
            row_value: f(self.row_value),
        }
    }
}

impl<T> AsRef<T> for TypedRow<T> {
    fn as_ref(&self) -> &T {
        &self.row_value
    }
}
