//! Composite primary keys and row-identity policies
//!
//! Every row is addressed by a two-part key: the partition key groups
//! related rows, the sort key orders and filters within a partition. The
//! attribute *names* under which the two parts are stored are a policy
//! decision, expressed as the [`RowIdentity`] trait so a table can host
//! multiple key layouts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute-naming policy for the two key parts
///
/// Implementations pick the attribute names under which the partition and
/// sort key are persisted. Most tables use [`StandardRowIdentity`]; a
/// secondary-index layout supplies its own names.
pub trait RowIdentity {
    /// Attribute name holding the partition key
    const PARTITION_KEY_ATTRIBUTE: &'static str;
    /// Attribute name holding the sort key
    const SORT_KEY_ATTRIBUTE: &'static str;
}

/// The default row identity: `"PK"` / `"SK"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardRowIdentity;

impl RowIdentity for StandardRowIdentity {
    const PARTITION_KEY_ATTRIBUTE: &'static str = "PK";
    const SORT_KEY_ATTRIBUTE: &'static str = "SK";
}

/// Two-part key identifying a row
///
/// Immutable once created. Sort keys compare lexicographically, which is
/// what range conditions over a partition rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositePrimaryKey {
    /// Groups related rows
    pub partition_key: String,
    /// Orders and filters rows within a partition
    pub sort_key: String,
}

impl CompositePrimaryKey {
    /// Create a new composite key
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

impl fmt::Display for CompositePrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition_key, self.sort_key)
    }
}

// Ord orders by partition key first, then sort key, matching how a
// partition scan produces rows.
impl Ord for CompositePrimaryKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.partition_key
            .cmp(&other.partition_key)
            .then_with(|| self.sort_key.cmp(&other.sort_key))
    }
}

impl PartialOrd for CompositePrimaryKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
