//! In-memory reference table
//!
//! Backs the same conditional-write contract as a real store using only
//! local data structures: partition key → sort key → encoded row. Rows are
//! kept *encoded* so reads go through the same decode-and-type-check path
//! as any other backing store, surfacing `TypeMismatch` instead of a cast
//! failure.
//!
//! A single `RwLock` per table instance serializes access; all methods
//! take `&self` and the table is safe to share across threads.

use crate::attributes::{self, AttributeMap, ROW_VERSION_ATTRIBUTE};
use crate::codec::{self, ItemPayload, PolymorphicRow};
use crate::condition::{ScanOrder, SortKeyCondition};
use crate::table::{PageToken, QueryPage, Table};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use keyrow_core::{CompositePrimaryKey, Error, Result, RowIdentity, TypedRow};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

type Partition = BTreeMap<String, AttributeMap>;

/// In-memory table with the full conditional-write contract
///
/// The reference implementation used by tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryTable {
    rows: RwLock<FxHashMap<String, Partition>>,
}

impl InMemoryTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored rows, across all partitions
    pub fn row_count(&self) -> usize {
        self.rows.read().values().map(Partition::len).sum()
    }

    /// Collect a partition's matching rows in ascending sort-key order
    fn collect_matching(
        &self,
        partition_key: &str,
        condition: Option<&SortKeyCondition>,
    ) -> Vec<AttributeMap> {
        let rows = self.rows.read();
        match rows.get(partition_key) {
            Some(partition) => partition
                .iter()
                .filter(|(sort_key, _)| {
                    condition.map_or(true, |cond| cond.matches(sort_key))
                })
                .map(|(_, stored)| stored.clone())
                .collect(),
            None => Vec::new(),
        }
    }
}

impl Table for InMemoryTable {
    fn insert_item<K: RowIdentity, T: ItemPayload>(&self, item: &TypedRow<T>) -> Result<()> {
        let encoded = codec::encode_item::<K, T>(item)?;
        let mut rows = self.rows.write();
        let partition = rows.entry(item.key.partition_key.clone()).or_default();
        if partition.contains_key(&item.key.sort_key) {
            return Err(Error::conditional_check_failed(
                &item.key,
                "a row already exists at this key",
            ));
        }
        partition.insert(item.key.sort_key.clone(), encoded);
        debug!(key = %item.key, version = item.row_version(), "inserted row");
        Ok(())
    }

    fn clobber_item<K: RowIdentity, T: ItemPayload>(&self, item: &TypedRow<T>) -> Result<()> {
        let encoded = codec::encode_item::<K, T>(item)?;
        let mut rows = self.rows.write();
        rows.entry(item.key.partition_key.clone())
            .or_default()
            .insert(item.key.sort_key.clone(), encoded);
        debug!(key = %item.key, version = item.row_version(), "clobbered row");
        Ok(())
    }

    fn update_item<K: RowIdentity, T: ItemPayload>(
        &self,
        new_item: &TypedRow<T>,
        existing_item: &TypedRow<T>,
    ) -> Result<()> {
        let encoded = codec::encode_item::<K, T>(new_item)?;
        let mut rows = self.rows.write();
        let stored = rows
            .get_mut(&new_item.key.partition_key)
            .and_then(|partition| partition.get_mut(&new_item.key.sort_key))
            .ok_or_else(|| {
                Error::conditional_check_failed(&new_item.key, "no row exists at this key")
            })?;

        // The check is against the *currently stored* version, not anything
        // the caller claims about new_item: stale knowledge is rejected
        // even when the payload happens to be identical.
        let stored_version = attributes::get_version(stored, ROW_VERSION_ATTRIBUTE)?;
        if stored_version != existing_item.status.row_version {
            debug!(
                key = %new_item.key,
                stored_version,
                expected = existing_item.status.row_version,
                "rejected stale update"
            );
            return Err(Error::conditional_check_failed(
                &new_item.key,
                format!(
                    "row version mismatch: stored {stored_version}, caller expected {}",
                    existing_item.status.row_version
                ),
            ));
        }

        *stored = encoded;
        debug!(key = %new_item.key, version = new_item.row_version(), "updated row");
        Ok(())
    }

    fn get_item<K: RowIdentity, T: ItemPayload>(
        &self,
        key: &CompositePrimaryKey,
    ) -> Result<Option<TypedRow<T>>> {
        let rows = self.rows.read();
        match rows
            .get(&key.partition_key)
            .and_then(|partition| partition.get(&key.sort_key))
        {
            Some(stored) => codec::decode_item::<K, T>(stored).map(Some),
            None => Ok(None),
        }
    }

    fn delete_item<K: RowIdentity>(&self, key: &CompositePrimaryKey) -> Result<()> {
        let mut rows = self.rows.write();
        if let Some(partition) = rows.get_mut(&key.partition_key) {
            partition.remove(&key.sort_key);
            if partition.is_empty() {
                rows.remove(&key.partition_key);
            }
        }
        debug!(key = %key, "deleted row");
        Ok(())
    }

    fn delete_existing_item<K: RowIdentity, T: ItemPayload>(
        &self,
        existing_item: &TypedRow<T>,
    ) -> Result<()> {
        let mut rows = self.rows.write();
        let partition = rows
            .get_mut(&existing_item.key.partition_key)
            .ok_or_else(|| {
                Error::conditional_check_failed(&existing_item.key, "no row exists at this key")
            })?;
        let stored = partition.get(&existing_item.key.sort_key).ok_or_else(|| {
            Error::conditional_check_failed(&existing_item.key, "no row exists at this key")
        })?;

        let stored_version = attributes::get_version(stored, ROW_VERSION_ATTRIBUTE)?;
        if stored_version != existing_item.status.row_version {
            return Err(Error::conditional_check_failed(
                &existing_item.key,
                format!(
                    "row version mismatch: stored {stored_version}, caller expected {}",
                    existing_item.status.row_version
                ),
            ));
        }

        partition.remove(&existing_item.key.sort_key);
        if partition.is_empty() {
            rows.remove(&existing_item.key.partition_key);
        }
        debug!(key = %existing_item.key, "conditionally deleted row");
        Ok(())
    }

    fn query<K: RowIdentity, P: PolymorphicRow>(
        &self,
        partition_key: &str,
        condition: Option<&SortKeyCondition>,
    ) -> Result<Vec<P>> {
        self.collect_matching(partition_key, condition)
            .iter()
            .map(codec::decode_polymorphic_item)
            .collect()
    }

    fn query_page<K: RowIdentity, P: PolymorphicRow>(
        &self,
        partition_key: &str,
        condition: Option<&SortKeyCondition>,
        order: ScanOrder,
        limit: usize,
        exclusive_start: Option<&PageToken>,
    ) -> Result<QueryPage<P>> {
        if limit == 0 {
            return Err(Error::database("page limit must be at least 1"));
        }

        let mut matching = self.collect_matching(partition_key, condition);
        if order == ScanOrder::Reverse {
            matching.reverse();
        }

        let offset = match exclusive_start {
            Some(token) => decode_offset(token)?,
            None => 0,
        };
        let total = matching.len();
        let start = offset.min(total);
        let end = offset.saturating_add(limit).min(total);

        let items = matching[start..end]
            .iter()
            .map(codec::decode_polymorphic_item)
            .collect::<Result<Vec<P>>>()?;
        let last_evaluated = (end < total).then(|| encode_offset(end));

        Ok(QueryPage {
            items,
            last_evaluated,
        })
    }
}

fn encode_offset(offset: usize) -> PageToken {
    PageToken::new(BASE64.encode(offset.to_string()))
}

fn decode_offset(token: &PageToken) -> Result<usize> {
    let bytes = BASE64
        .decode(token.as_str())
        .map_err(|_| Error::database("invalid pagination token"))?;
    std::str::from_utf8(&bytes)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| Error::database("invalid pagination token"))
}
