//! Optimistic-concurrency write patterns for keyrow
//!
//! This crate layers the retry-driven algorithms over any `Table`:
//! - ConditionalUpdate: bounded-retry read-modify-write updates
//! - HistoricalWrites: primary-plus-audit-row write patterns
//! - ConcurrencySimulatingTable: deterministic conflict injection for
//!   exercising retry logic in tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod historical;
pub mod retry;
pub mod simulate;

pub use historical::{HistoricalWrites, DEFAULT_HISTORICAL_RETRIES};
pub use retry::{ConditionalUpdate, DEFAULT_UPDATE_RETRIES};
pub use simulate::ConcurrencySimulatingTable;
