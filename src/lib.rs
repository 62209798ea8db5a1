//! keyrow - typed access over composite-primary-key document tables
//!
//! keyrow layers typed, optimistic-concurrency CRUD on top of a
//! schemaless partition-key/sort-key table: versioned rows, polymorphic
//! row decoding, paginated range queries, bounded-retry conditional
//! updates, and historical ("audit trail") write patterns.
//!
//! # Quick Start
//!
//! ```
//! use keyrow::{
//!     CompositePrimaryKey, ConditionalUpdate, InMemoryTable, ItemPayload,
//!     StandardRowIdentity, Table, TypedRow, DEFAULT_UPDATE_RETRIES,
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Counter {
//!     count: u64,
//! }
//!
//! impl ItemPayload for Counter {
//!     const ROW_TYPE: &'static str = "Counter";
//! }
//!
//! # fn main() -> keyrow::Result<()> {
//! let table = InMemoryTable::new();
//! let key = CompositePrimaryKey::new("counters", "hits");
//!
//! // insert at version 1
//! let row = TypedRow::new_item(key.clone(), Counter { count: 0 });
//! table.insert_item::<StandardRowIdentity, _>(&row)?;
//!
//! // read-modify-write with retry on version conflicts
//! let updated = table.conditionally_update_item::<StandardRowIdentity, Counter, _>(
//!     &key,
//!     DEFAULT_UPDATE_RETRIES,
//!     |current| Ok(Counter { count: current.count + 1 }),
//! )?;
//! assert_eq!(updated.row_version(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The contract types live in `keyrow-core`, the codec and table
//! implementations in `keyrow-table`, and the retry-driven write patterns
//! in `keyrow-concurrency`. This facade re-exports the public API of all
//! three.

// Re-export the public API from the member crates
pub use keyrow_concurrency::*;
pub use keyrow_core::*;
pub use keyrow_table::*;
