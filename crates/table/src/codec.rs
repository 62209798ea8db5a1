//! Polymorphic row codec
//!
//! Encodes a [`TypedRow`] to the flat attribute-map representation and
//! back. The payload's fields merge into the same map level as the
//! reserved attributes (never nested under a payload key), and every row
//! carries a `RowType` discriminator so heterogeneous payload types can
//! share one partition.
//!
//! Decoding polymorphically goes through [`PolymorphicRow`]: the caller
//! supplies the discriminator registry as an exhaustively-checked match,
//! one variant per payload type. A discriminator missing from the match
//! fails with [`Error::UnexpectedRowType`], which protects against
//! accidentally decoding a row into the wrong type.
//!
//! Round-trip law: `decode_item(encode_item(row)) == row` for every
//! payload whose fields survive its own serde round trip.

use crate::attributes::{
    self, AttributeMap, CREATE_DATE_ATTRIBUTE, LAST_UPDATED_ATTRIBUTE, ROW_TYPE_ATTRIBUTE,
    ROW_VERSION_ATTRIBUTE,
};
use keyrow_core::{CompositePrimaryKey, Error, Result, RowIdentity, RowStatus, TypedRow};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A payload type storable as a row
///
/// `ROW_TYPE` is the discriminator string persisted with every row of this
/// type; it is what polymorphic decoding dispatches on, so two payload
/// types sharing a table must not share a discriminator.
pub trait ItemPayload: Serialize + DeserializeOwned + Clone {
    /// Discriminator string stored in the `RowType` attribute
    const ROW_TYPE: &'static str;
}

/// A caller-supplied registry of decodable payload types
///
/// Implemented on an enum with one variant per payload type sharing the
/// partition; `from_row` is the explicit discriminator table:
///
/// ```
/// use keyrow_core::{Error, Result, StandardRowIdentity, TypedRow};
/// use keyrow_table::{decode_item, AttributeMap, ItemPayload, PolymorphicRow};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Profile { name: String }
/// impl ItemPayload for Profile {
///     const ROW_TYPE: &'static str = "Profile";
/// }
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Order { total_cents: u64 }
/// impl ItemPayload for Order {
///     const ROW_TYPE: &'static str = "Order";
/// }
///
/// enum AccountRow {
///     Profile(TypedRow<Profile>),
///     Order(TypedRow<Order>),
/// }
///
/// impl PolymorphicRow for AccountRow {
///     fn from_row(row_type: &str, attributes: &AttributeMap) -> Result<Self> {
///         match row_type {
///             Profile::ROW_TYPE => {
///                 decode_item::<StandardRowIdentity, Profile>(attributes)
///                     .map(AccountRow::Profile)
///             }
///             Order::ROW_TYPE => {
///                 decode_item::<StandardRowIdentity, Order>(attributes)
///                     .map(AccountRow::Order)
///             }
///             other => Err(Error::UnexpectedRowType {
///                 provided: other.to_string(),
///             }),
///         }
///     }
/// }
/// ```
pub trait PolymorphicRow: Sized {
    /// Decode a stored row given its discriminator
    ///
    /// # Errors
    /// Implementations return [`Error::UnexpectedRowType`] for a
    /// discriminator they do not recognize.
    fn from_row(row_type: &str, attributes: &AttributeMap) -> Result<Self>;
}

/// Encode a typed row to its attribute-map representation
///
/// # Errors
/// [`Error::TypeMismatch`] if the payload does not serialize to a map;
/// [`Error::Database`] if a payload field collides with a reserved
/// attribute name.
pub fn encode_item<K: RowIdentity, T: ItemPayload>(item: &TypedRow<T>) -> Result<AttributeMap> {
    let mut map = match serde_json::to_value(&item.row_value)? {
        Value::Object(map) => map,
        other => {
            return Err(Error::TypeMismatch {
                expected: "a map-shaped payload".to_string(),
                provided: attributes::json_type_name(&other).to_string(),
            })
        }
    };

    for reserved in reserved_attributes::<K>() {
        if map.contains_key(reserved) {
            return Err(Error::database(format!(
                "payload field {reserved:?} collides with a reserved attribute"
            )));
        }
    }

    map.insert(
        K::PARTITION_KEY_ATTRIBUTE.to_string(),
        Value::String(item.key.partition_key.clone()),
    );
    map.insert(
        K::SORT_KEY_ATTRIBUTE.to_string(),
        Value::String(item.key.sort_key.clone()),
    );
    map.insert(
        ROW_TYPE_ATTRIBUTE.to_string(),
        Value::String(T::ROW_TYPE.to_string()),
    );
    map.insert(
        CREATE_DATE_ATTRIBUTE.to_string(),
        Value::String(item.create_date.to_rfc3339()),
    );
    map.insert(
        ROW_VERSION_ATTRIBUTE.to_string(),
        Value::from(item.status.row_version),
    );
    map.insert(
        LAST_UPDATED_ATTRIBUTE.to_string(),
        Value::String(item.status.last_updated.to_rfc3339()),
    );
    Ok(map)
}

/// Decode a typed row from its attribute-map representation
///
/// # Errors
/// [`Error::TypeMismatch`] if the stored discriminator is not
/// `T::ROW_TYPE`; [`Error::Database`] if a reserved attribute is missing
/// or malformed; [`Error::Serialization`] if the payload fields do not
/// deserialize into `T`.
pub fn decode_item<K: RowIdentity, T: ItemPayload>(attributes: &AttributeMap) -> Result<TypedRow<T>> {
    let row_type = attributes::get_string(attributes, ROW_TYPE_ATTRIBUTE)?;
    if row_type != T::ROW_TYPE {
        return Err(Error::TypeMismatch {
            expected: T::ROW_TYPE.to_string(),
            provided: row_type.to_string(),
        });
    }

    let partition_key = attributes::get_string(attributes, K::PARTITION_KEY_ATTRIBUTE)?;
    let sort_key = attributes::get_string(attributes, K::SORT_KEY_ATTRIBUTE)?;
    let key = CompositePrimaryKey::new(partition_key, sort_key);

    let create_date = attributes::get_timestamp(attributes, CREATE_DATE_ATTRIBUTE)?;
    let row_version = attributes::get_version(attributes, ROW_VERSION_ATTRIBUTE)?;
    let last_updated = attributes::get_timestamp(attributes, LAST_UPDATED_ATTRIBUTE)?;

    let mut payload = attributes.clone();
    for reserved in reserved_attributes::<K>() {
        payload.remove(reserved);
    }
    let row_value: T = serde_json::from_value(Value::Object(payload))?;

    Ok(TypedRow {
        key,
        create_date,
        status: RowStatus {
            row_version,
            last_updated,
        },
        row_value,
    })
}

/// Decode a stored row through a caller-supplied registry
///
/// # Errors
/// [`Error::UnexpectedRowType`] if the stored discriminator is not in the
/// registry, plus whatever the matched decoder returns.
pub fn decode_polymorphic_item<P: PolymorphicRow>(attributes: &AttributeMap) -> Result<P> {
    let row_type = attributes::get_string(attributes, ROW_TYPE_ATTRIBUTE)?;
    P::from_row(row_type, attributes)
}

fn reserved_attributes<K: RowIdentity>() -> [&'static str; 6] {
    [
        K::PARTITION_KEY_ATTRIBUTE,
        K::SORT_KEY_ATTRIBUTE,
        ROW_TYPE_ATTRIBUTE,
        CREATE_DATE_ATTRIBUTE,
        ROW_VERSION_ATTRIBUTE,
        LAST_UPDATED_ATTRIBUTE,
    ]
}
