//! Sort-key range conditions
//!
//! Queries within a partition narrow the result set with a condition over
//! the sort key. All comparisons are lexicographic over the raw sort-key
//! string; callers who need numeric ordering zero-pad (see
//! `keyrow_core::keypath`).

use serde::{Deserialize, Serialize};

/// Condition over the sort key of a partition query
///
/// `Between` is inclusive at both bounds. The underlying store and the
/// in-memory reference table apply the same semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKeyCondition {
    /// Sort key equals the value
    Equals(String),
    /// Sort key is strictly less than the value
    LessThan(String),
    /// Sort key is less than or equal to the value
    LessThanOrEqual(String),
    /// Sort key is strictly greater than the value
    GreaterThan(String),
    /// Sort key is greater than or equal to the value
    GreaterThanOrEqual(String),
    /// Sort key is within `[lo, hi]`, inclusive at both bounds
    Between(String, String),
    /// Sort key starts with the prefix
    BeginsWith(String),
}

impl SortKeyCondition {
    /// Evaluate the condition against a sort key
    pub fn matches(&self, sort_key: &str) -> bool {
        match self {
            SortKeyCondition::Equals(value) => sort_key == value,
            SortKeyCondition::LessThan(value) => sort_key < value.as_str(),
            SortKeyCondition::LessThanOrEqual(value) => sort_key <= value.as_str(),
            SortKeyCondition::GreaterThan(value) => sort_key > value.as_str(),
            SortKeyCondition::GreaterThanOrEqual(value) => sort_key >= value.as_str(),
            SortKeyCondition::Between(lo, hi) => {
                sort_key >= lo.as_str() && sort_key <= hi.as_str()
            }
            SortKeyCondition::BeginsWith(prefix) => sort_key.starts_with(prefix.as_str()),
        }
    }
}

/// Scan direction for paged queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// Ascending sort-key order
    #[default]
    Forward,
    /// Descending sort-key order
    Reverse,
}
