//! Payload wrapper patterns
//!
//! Two wrappers layer extra attributes onto a payload without touching the
//! row contract itself:
//!
//! - [`RowWithItemVersion`] gives the *payload* an application-level
//!   version number independent of the storage-level `row_version`. This is
//!   how historical copies kept at different storage versions can share one
//!   logical item version.
//! - [`RowWithIndex`] attaches a queryable secondary-index value under a
//!   caller-declared attribute name.
//!
//! Both serialize flattened: the wrapper attribute and the inner payload's
//! fields land at the same map level.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Attribute name of the flattened item version
pub const ITEM_VERSION_ATTRIBUTE: &str = "ItemVersion";

/// A payload carrying its own application-level version
///
/// `item_version` is independent of the row's storage-level version: a
/// historical copy written at storage version 7 can still be logical item
/// version 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWithItemVersion<T> {
    /// Application-level version of the payload
    #[serde(rename = "ItemVersion")]
    pub item_version: u64,
    /// The wrapped payload; its fields flatten into the same map level
    #[serde(flatten)]
    pub row_value: T,
}

impl<T> RowWithItemVersion<T> {
    /// Wrap a payload at item version 1
    pub fn new_item(row_value: T) -> Self {
        RowWithItemVersion {
            item_version: 1,
            row_value,
        }
    }

    /// Wrap a payload at an explicit item version
    pub fn with_version(item_version: u64, row_value: T) -> Self {
        RowWithItemVersion {
            item_version,
            row_value,
        }
    }

    /// Produce the successor payload with `item_version + 1`
    pub fn create_updated_item(&self, new_value: T) -> RowWithItemVersion<T> {
        RowWithItemVersion {
            item_version: self.item_version + 1,
            row_value: new_value,
        }
    }

    /// Get a reference to the wrapped payload
    #[inline]
    pub fn value(&self) -> &T {
        &self.row_value
    }
}

/// Attribute-naming policy for a secondary index value
pub trait IndexIdentity {
    /// Attribute name under which the index value is stored
    const INDEX_ATTRIBUTE: &'static str;
}

/// A payload carrying a queryable secondary-index value
///
/// The index attribute name comes from the `I: IndexIdentity` policy, so
/// the same payload type can be indexed under different attribute names by
/// different tables.
pub struct RowWithIndex<T, I> {
    /// The index value stored under `I::INDEX_ATTRIBUTE`
    pub index_value: String,
    /// The wrapped payload; its fields flatten into the same map level
    pub row_value: T,
    identity: PhantomData<fn() -> I>,
}

impl<T, I> RowWithIndex<T, I> {
    /// Wrap a payload with an index value
    pub fn new(index_value: impl Into<String>, row_value: T) -> Self {
        RowWithIndex {
            index_value: index_value.into(),
            row_value,
            identity: PhantomData,
        }
    }

    /// Get a reference to the wrapped payload
    #[inline]
    pub fn value(&self) -> &T {
        &self.row_value
    }
}

impl<T: fmt::Debug, I> fmt::Debug for RowWithIndex<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowWithIndex")
            .field("index_value", &self.index_value)
            .field("row_value", &self.row_value)
            .finish()
    }
}

impl<T: Clone, I> Clone for RowWithIndex<T, I> {
    fn clone(&self) -> Self {
        RowWithIndex {
            index_value: self.index_value.clone(),
            row_value: self.row_value.clone(),
            identity: PhantomData,
        }
    }
}

impl<T: PartialEq, I> PartialEq for RowWithIndex<T, I> {
    fn eq(&self, other: &Self) -> bool {
        self.index_value == other.index_value && self.row_value == other.row_value
    }
}

impl<T: Serialize, I: IndexIdentity> Serialize for RowWithIndex<T, I> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut merged = match serde_json::to_value(&self.row_value)
            .map_err(serde::ser::Error::custom)?
        {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(serde::ser::Error::custom(format!(
                    "indexed payload must serialize to a map, got {}",
                    json_type_name(&other)
                )))
            }
        };
        if merged.contains_key(I::INDEX_ATTRIBUTE) {
            return Err(serde::ser::Error::custom(format!(
                "payload field {:?} collides with the index attribute",
                I::INDEX_ATTRIBUTE
            )));
        }
        merged.insert(
            I::INDEX_ATTRIBUTE.to_string(),
            serde_json::Value::String(self.index_value.clone()),
        );
        merged.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned, I: IndexIdentity> Deserialize<'de> for RowWithIndex<T, I> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let index_value = match map.remove(I::INDEX_ATTRIBUTE) {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "index attribute {:?} must be a string, got {}",
                    I::INDEX_ATTRIBUTE,
                    json_type_name(&other)
                )))
            }
            None => {
                return Err(serde::de::Error::custom(format!(
                    "missing index attribute {:?}",
                    I::INDEX_ATTRIBUTE
                )))
            }
        };
        let row_value = serde_json::from_value(serde_json::Value::Object(map))
            .map_err(serde::de::Error::custom)?;
        Ok(RowWithIndex {
            index_value,
            row_value,
            identity: PhantomData,
        })
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a map",
    }
}
