//! Historical-row write patterns
//!
//! Composes a primary versioned write with a secondary "audit" write into
//! another partition. The two writes are best-effort from the caller's
//! perspective: if the historical insert fails after the primary write
//! succeeded, the caller sees that failure and no compensating rollback of
//! the primary is attempted.
//!
//! Retried variants re-read the primary and re-invoke both providers on
//! every cycle, so the historical item is always derived from the primary
//! item that was actually attempted. Callers keep the historical write
//! idempotent by keying historical sort keys to the payload's item version
//! (see `keyrow_core::keypath::compose_versioned_key`): a retried cycle
//! then targets a fresh historical key instead of duplicating rows.

use keyrow_core::{CompositePrimaryKey, Error, Result, RowIdentity, TypedRow};
use keyrow_table::{ItemPayload, Table};
use tracing::debug;

use crate::retry::DEFAULT_UPDATE_RETRIES;

/// Primary-plus-historical write patterns over any [`Table`]
pub trait HistoricalWrites: Table {
    /// Insert a primary row, then insert its historical copy
    ///
    /// # Errors
    /// Either insert's failure surfaces as-is; a failed historical insert
    /// does not roll the primary back.
    fn insert_item_with_historical_row<K, T, H>(
        &self,
        primary: &TypedRow<T>,
        historical: &TypedRow<H>,
    ) -> Result<()>
    where
        K: RowIdentity,
        T: ItemPayload,
        H: ItemPayload,
    {
        self.insert_item::<K, T>(primary)?;
        self.insert_item::<K, H>(historical)
    }

    /// Conditionally update a primary row, then insert its historical copy
    ///
    /// # Errors
    /// The update's [`Error::ConditionalCheckFailed`] or the historical
    /// insert's failure surfaces as-is.
    fn update_item_with_historical_row<K, T, H>(
        &self,
        new_item: &TypedRow<T>,
        existing_item: &TypedRow<T>,
        historical: &TypedRow<H>,
    ) -> Result<()>
    where
        K: RowIdentity,
        T: ItemPayload,
        H: ItemPayload,
    {
        self.update_item::<K, T>(new_item, existing_item)?;
        self.insert_item::<K, H>(historical)
    }

    /// Write a primary row whether or not one exists, with a historical
    /// copy, retrying the whole cycle on conflicts
    ///
    /// Reads the current primary at `key` (possibly absent), asks
    /// `primary_provider` for the replacement (it must handle both cases),
    /// derives the historical item from the replacement, and performs
    /// insert-with-historical or update-with-historical depending on
    /// whether a primary existed. A [`Error::ConditionalCheckFailed`] from
    /// either write restarts the cycle with freshly read state.
    ///
    /// # Errors
    /// - [`Error::Concurrency`] once `retries` cycles have conflicted
    /// - any error from `primary_provider`, propagated without retrying
    fn clobber_item_with_historical_row<K, T, H, FP, FH>(
        &self,
        key: &CompositePrimaryKey,
        retries: usize,
        primary_provider: FP,
        historical_provider: FH,
    ) -> Result<TypedRow<T>>
    where
        K: RowIdentity,
        T: ItemPayload,
        H: ItemPayload,
        FP: Fn(Option<&TypedRow<T>>) -> Result<TypedRow<T>>,
        FH: Fn(&TypedRow<T>) -> TypedRow<H>,
    {
        let mut remaining = retries;
        loop {
            if remaining == 0 {
                return Err(Error::concurrency(
                    key,
                    format!("clobber still conflicted after {retries} attempts"),
                ));
            }

            let current = self.get_item::<K, T>(key)?;
            let new_item = primary_provider(current.as_ref())?;
            let historical = historical_provider(&new_item);

            let outcome = match &current {
                None => self.insert_item_with_historical_row::<K, T, H>(&new_item, &historical),
                Some(existing) => self.update_item_with_historical_row::<K, T, H>(
                    &new_item,
                    existing,
                    &historical,
                ),
            };

            match outcome {
                Ok(()) => return Ok(new_item),
                Err(Error::ConditionalCheckFailed { .. }) => {
                    remaining -= 1;
                    debug!(key = %key, remaining, "historical clobber conflicted, retrying");
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Update an existing primary row with a historical copy, retrying on
    /// version conflicts
    ///
    /// The bounded-retry conditional update, except that the success path
    /// performs two writes (primary update + historical insert) and the
    /// updated primary row is returned.
    ///
    /// # Errors
    /// - [`Error::ConditionalCheckFailed`] if no row exists at `key`
    /// - [`Error::Concurrency`] once the retry budget is exhausted
    /// - any error from `primary_provider`, propagated without retrying
    fn conditionally_update_item_with_historical_row<K, T, H, FP, FH>(
        &self,
        key: &CompositePrimaryKey,
        retries: usize,
        primary_provider: FP,
        historical_provider: FH,
    ) -> Result<TypedRow<T>>
    where
        K: RowIdentity,
        T: ItemPayload,
        H: ItemPayload,
        FP: Fn(&TypedRow<T>) -> Result<TypedRow<T>>,
        FH: Fn(&TypedRow<T>) -> TypedRow<H>,
    {
        let mut remaining = retries;
        loop {
            if remaining == 0 {
                return Err(Error::concurrency(
                    key,
                    format!("update still conflicted after {retries} attempts"),
                ));
            }

            let current = self.get_item::<K, T>(key)?.ok_or_else(|| {
                Error::conditional_check_failed(key, "no row exists to update")
            })?;
            let new_item = primary_provider(&current)?;
            let historical = historical_provider(&new_item);

            match self.update_item_with_historical_row::<K, T, H>(&new_item, &current, &historical)
            {
                Ok(()) => return Ok(new_item),
                Err(Error::ConditionalCheckFailed { .. }) => {
                    remaining -= 1;
                    debug!(key = %key, remaining, "historical update conflicted, retrying");
                }
                Err(other) => return Err(other),
            }
        }
    }
}

impl<W: Table + ?Sized> HistoricalWrites for W {}

/// Re-exported default retry bound, shared with the plain update path
pub const DEFAULT_HISTORICAL_RETRIES: usize = DEFAULT_UPDATE_RETRIES;
