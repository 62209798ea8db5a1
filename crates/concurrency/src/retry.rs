//! Bounded-retry conditional updates
//!
//! The optimistic-concurrency write path: read the current row, compute
//! the replacement, attempt a conditional write, and on a version conflict
//! re-read and try again up to a bound. No in-process locking and no
//! backoff; the backing store's conditional write is the only
//! serialization point and correctness relies on the bound, not timing.
//!
//! Only [`Error::ConditionalCheckFailed`] coming from the write attempt is
//! converted into a retry. Errors from the caller-supplied update closure
//! propagate immediately and do not consume an attempt.

use keyrow_core::{CompositePrimaryKey, Error, Result, RowIdentity, TypedRow};
use keyrow_table::{ItemPayload, Table};
use tracing::debug;

/// Default retry bound for conditional updates
pub const DEFAULT_UPDATE_RETRIES: usize = 10;

/// Bounded-retry conditional updates over any [`Table`]
pub trait ConditionalUpdate: Table {
    /// Update a row's payload through a value transform, retrying on
    /// version conflicts
    ///
    /// Reads the row at `key`, applies `update` to the payload, writes the
    /// successor row conditionally, and retries the whole cycle on a
    /// conflict, up to `retries` attempts. Returns the row that was
    /// written.
    ///
    /// # Errors
    /// - [`Error::ConditionalCheckFailed`] if no row exists at `key`
    /// - [`Error::Concurrency`] once the retry budget is exhausted
    /// - any error returned by `update`, propagated without retrying
    fn conditionally_update_item<K, T, F>(
        &self,
        key: &CompositePrimaryKey,
        retries: usize,
        update: F,
    ) -> Result<TypedRow<T>>
    where
        K: RowIdentity,
        T: ItemPayload,
        F: Fn(&T) -> Result<T>,
    {
        self.conditionally_update_item_with_provider::<K, T, _>(key, retries, |current| {
            let new_value = update(&current.row_value)?;
            Ok(current.create_updated_item(new_value))
        })
    }

    /// Update a row through a whole-item transform, retrying on version
    /// conflicts
    ///
    /// Like [`conditionally_update_item`](Self::conditionally_update_item)
    /// but `provider` builds the full replacement row itself (it is
    /// responsible for the version bump, normally via
    /// `create_updated_item`).
    ///
    /// # Errors
    /// Same contract as
    /// [`conditionally_update_item`](Self::conditionally_update_item).
    fn conditionally_update_item_with_provider<K, T, F>(
        &self,
        key: &CompositePrimaryKey,
        retries: usize,
        provider: F,
    ) -> Result<TypedRow<T>>
    where
        K: RowIdentity,
        T: ItemPayload,
        F: Fn(&TypedRow<T>) -> Result<TypedRow<T>>,
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
            let new_item = provider(&current)?;

            match self.update_item::<K, T>(&new_item, &current) {
                Ok(()) => return Ok(new_item),
                Err(Error::ConditionalCheckFailed { .. }) => {
                    remaining -= 1;
                    debug!(key = %key, remaining, "conditional update conflicted, retrying");
                }
                Err(other) => return Err(other),
            }
        }
    }
}

impl<W: Table + ?Sized> ConditionalUpdate for W {}
