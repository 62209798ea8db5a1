//! The table capability interface
//!
//! [`Table`] is the seam between the typed layer and a concrete backing
//! store: the in-memory reference implementation, a wire-protocol client,
//! or a test decorator. Correctness of the layers above rests entirely on
//! the conditional-write semantics documented per method; no in-process
//! locking is assumed.

use crate::codec::{ItemPayload, PolymorphicRow};
use crate::condition::{ScanOrder, SortKeyCondition};
use keyrow_core::{CompositePrimaryKey, Result, RowIdentity, TypedRow};

/// Opaque pagination cursor
///
/// Returned by [`Table::query_page`] and fed back in to resume the scan.
/// The content is implementation-defined; callers must not interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken(String);

impl PageToken {
    /// Wrap an implementation-defined cursor value
    pub fn new(raw: impl Into<String>) -> Self {
        PageToken(raw.into())
    }

    /// The raw cursor value, for implementations to interpret
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a partition query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<P> {
    /// Decoded rows in this page
    pub items: Vec<P>,
    /// Cursor for the next page; `None` when no pages remain
    pub last_evaluated: Option<PageToken>,
}

/// Capability interface over a composite-primary-key table
///
/// Every operation is parameterized by a row-identity policy `K` (the
/// attribute names the key parts are stored under) and, where a payload is
/// involved, a payload type.
///
/// ## Single-key state machine
///
/// ```text
/// Absent ──insert──▶ Present(v=1)
/// Present(v=n) ──update, version match──▶ Present(v=n+1)
/// Present(v=n) ──update, version mismatch──▶ unchanged, error
/// Present(v=n) ──delete──▶ Absent
/// ```
pub trait Table {
    /// Insert a brand-new row
    ///
    /// # Errors
    /// [`keyrow_core::Error::ConditionalCheckFailed`] if a row already
    /// exists at `item.key`, regardless of payload equality.
    fn insert_item<K: RowIdentity, T: ItemPayload>(&self, item: &TypedRow<T>) -> Result<()>;

    /// Overwrite unconditionally, ignoring current state and version
    ///
    /// Never fails due to contention.
    ///
    /// # Errors
    /// Returns an error only for encoding or backing-store failures.
    fn clobber_item<K: RowIdentity, T: ItemPayload>(&self, item: &TypedRow<T>) -> Result<()>;

    /// Conditionally replace a row
    ///
    /// Stores `new_item` as given; the caller is responsible for having
    /// produced it via `create_updated_item` (version already bumped).
    ///
    /// # Errors
    /// [`keyrow_core::Error::ConditionalCheckFailed`] unless the currently
    /// stored row's version equals `existing_item.status.row_version` and
    /// the key matches. A write against stale knowledge is rejected even
    /// if syntactically valid.
    fn update_item<K: RowIdentity, T: ItemPayload>(
        &self,
        new_item: &TypedRow<T>,
        existing_item: &TypedRow<T>,
    ) -> Result<()>;

    /// Fetch a row by key
    ///
    /// Returns `None` for an absent row; absence is never an error.
    ///
    /// # Errors
    /// [`keyrow_core::Error::TypeMismatch`] if the stored row is not a
    /// `T`, plus decoding and backing-store failures.
    fn get_item<K: RowIdentity, T: ItemPayload>(
        &self,
        key: &CompositePrimaryKey,
    ) -> Result<Option<TypedRow<T>>>;

    /// Delete whatever is stored at `key`
    ///
    /// Idempotent: succeeds whether or not the row existed.
    ///
    /// # Errors
    /// Returns an error only for backing-store failures.
    fn delete_item<K: RowIdentity>(&self, key: &CompositePrimaryKey) -> Result<()>;

    /// Delete a row the caller has previously read
    ///
    /// # Errors
    /// [`keyrow_core::Error::ConditionalCheckFailed`] unless the currently
    /// stored version equals `existing_item.status.row_version`, which
    /// protects against deleting a row that was concurrently modified.
    fn delete_existing_item<K: RowIdentity, T: ItemPayload>(
        &self,
        existing_item: &TypedRow<T>,
    ) -> Result<()>;

    /// Fetch all rows of a partition matching a sort-key condition
    ///
    /// Iterates internal pagination to completion; an absent partition
    /// yields an empty vec.
    ///
    /// # Errors
    /// Decoding errors (including
    /// [`keyrow_core::Error::UnexpectedRowType`] for discriminators
    /// missing from `P`'s registry) and backing-store failures.
    fn query<K: RowIdentity, P: PolymorphicRow>(
        &self,
        partition_key: &str,
        condition: Option<&SortKeyCondition>,
    ) -> Result<Vec<P>>;

    /// Fetch a single page of a partition query
    ///
    /// Pages are deterministic and exhaustive: iterating with any `limit`
    /// until `last_evaluated` is `None` visits every matching row exactly
    /// once, assuming the partition is not concurrently mutated.
    ///
    /// # Errors
    /// [`keyrow_core::Error::Database`] for an invalid `exclusive_start`
    /// or a zero `limit`, plus decoding and backing-store failures.
    fn query_page<K: RowIdentity, P: PolymorphicRow>(
        &self,
        partition_key: &str,
        condition: Option<&SortKeyCondition>,
        order: ScanOrder,
        limit: usize,
        exclusive_start: Option<&PageToken>,
    ) -> Result<QueryPage<P>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_token_is_opaque_wrapper() {
        let token = PageToken::new("cursor-state");
        assert_eq!(token.as_str(), "cursor-state");
        assert_eq!(token, PageToken::new("cursor-state".to_string()));
    }

    #[test]
    fn test_query_page_carries_cursor() {
        let page = QueryPage {
            items: vec!["a", "b"],
            last_evaluated: Some(PageToken::new("2")),
        };
        assert_eq!(page.items.len(), 2);
        assert!(page.last_evaluated.is_some());
    }
}
