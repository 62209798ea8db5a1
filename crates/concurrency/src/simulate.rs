//! Concurrency-simulating table decorator
//!
//! Wraps any [`Table`] and deterministically injects conflicting writes so
//! retry logic can be exercised without racing real threads: before
//! delegating an insert it first inserts the same item (so the real insert
//! conflicts), and before delegating an update it first bumps the stored
//! version with a no-op payload write (so the real update's condition check
//! fails). Injection stops after the configured count, after which the
//! decorator is pure passthrough.
//!
//! Test support only; not a production component.

use keyrow_core::{CompositePrimaryKey, Result, RowIdentity, TypedRow};
use keyrow_table::{
    ItemPayload, PageToken, PolymorphicRow, QueryPage, ScanOrder, SortKeyCondition, Table,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Decorator that injects a bounded number of conflicting writes
#[derive(Debug)]
pub struct ConcurrencySimulatingTable<W> {
    wrapped: W,
    simulate_concurrency_modifications: usize,
    simulate_on_insert: bool,
    simulate_on_update: bool,
    injected: AtomicUsize,
}

impl<W: Table> ConcurrencySimulatingTable<W> {
    /// Wrap a table, injecting up to `modifications` conflicts on both the
    /// insert and update paths
    pub fn new(wrapped: W, modifications: usize) -> Self {
        Self::with_toggles(wrapped, modifications, true, true)
    }

    /// Wrap a table with explicit control over which paths inject
    pub fn with_toggles(
        wrapped: W,
        modifications: usize,
        simulate_on_insert: bool,
        simulate_on_update: bool,
    ) -> Self {
        ConcurrencySimulatingTable {
            wrapped,
            simulate_concurrency_modifications: modifications,
            simulate_on_insert,
            simulate_on_update,
            injected: AtomicUsize::new(0),
        }
    }

    /// How many conflicting modifications have been injected so far
    pub fn injected_modifications(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    /// The wrapped table
    pub fn inner(&self) -> &W {
        &self.wrapped
    }

    /// Claim one injection slot, if any remain
    fn take_injection(&self) -> bool {
        self.injected
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.simulate_concurrency_modifications).then_some(n + 1)
            })
            .is_ok()
    }
}

impl<W: Table> Table for ConcurrencySimulatingTable<W> {
    fn insert_item<K: RowIdentity, T: ItemPayload>(&self, item: &TypedRow<T>) -> Result<()> {
        if self.simulate_on_insert && self.take_injection() {
            debug!(key = %item.key, "injecting conflicting insert");
            self.wrapped.insert_item::<K, T>(item)?;
        }
        self.wrapped.insert_item::<K, T>(item)
    }

    fn clobber_item<K: RowIdentity, T: ItemPayload>(&self, item: &TypedRow<T>) -> Result<()> {
        self.wrapped.clobber_item::<K, T>(item)
    }

    fn update_item<K: RowIdentity, T: ItemPayload>(
        &self,
        new_item: &TypedRow<T>,
        existing_item: &TypedRow<T>,
    ) -> Result<()> {
        if self.simulate_on_update && self.take_injection() {
            debug!(key = %existing_item.key, "injecting version-bumping update");
            let bump = existing_item.create_updated_item(existing_item.row_value.clone());
            self.wrapped.update_item::<K, T>(&bump, existing_item)?;
        }
        self.wrapped.update_item::<K, T>(new_item, existing_item)
    }

    fn get_item<K: RowIdentity, T: ItemPayload>(
        &self,
        key: &CompositePrimaryKey,
    ) -> Result<Option<TypedRow<T>>> {
        self.wrapped.get_item::<K, T>(key)
    }

    fn delete_item<K: RowIdentity>(&self, key: &CompositePrimaryKey) -> Result<()> {
        self.wrapped.delete_item::<K>(key)
    }

    fn delete_existing_item<K: RowIdentity, T: ItemPayload>(
        &self,
        existing_item: &TypedRow<T>,
    ) -> Result<()> {
        self.wrapped.delete_existing_item::<K, T>(existing_item)
    }

    fn query<K: RowIdentity, P: PolymorphicRow>(
        &self,
        partition_key: &str,
        condition: Option<&SortKeyCondition>,
    ) -> Result<Vec<P>> {
        self.wrapped.query::<K, P>(partition_key, condition)
    }

    fn query_page<K: RowIdentity, P: PolymorphicRow>(
        &self,
        partition_key: &str,
        condition: Option<&SortKeyCondition>,
        order: ScanOrder,
        limit: usize,
        exclusive_start: Option<&PageToken>,
    ) -> Result<QueryPage<P>> {
        self.wrapped
            .query_page::<K, P>(partition_key, condition, order, limit, exclusive_start)
    }
}
