//! Attribute-map model
//!
//! Rows persist as flat maps of named attributes. This module defines the
//! reserved attribute names and typed extraction helpers; missing or
//! malformed entries surface as [`Error::Database`] because they indicate
//! stored data this layer did not write.

use keyrow_core::{Error, Result, Timestamp};
use serde_json::Value;

/// The generic attribute-map representation of a stored row
pub type AttributeMap = serde_json::Map<String, Value>;

/// Discriminator string identifying the payload type of a row
pub const ROW_TYPE_ATTRIBUTE: &str = "RowType";

/// ISO-8601 creation timestamp, immutable after creation
pub const CREATE_DATE_ATTRIBUTE: &str = "CreateDate";

/// Storage-level row version number
pub const ROW_VERSION_ATTRIBUTE: &str = "RowVersion";

/// ISO-8601 timestamp of the last successful write
pub const LAST_UPDATED_ATTRIBUTE: &str = "LastUpdatedDate";

/// Extract a string attribute
///
/// # Errors
/// [`Error::Database`] if the attribute is missing or not a string.
pub fn get_string<'a>(attributes: &'a AttributeMap, name: &str) -> Result<&'a str> {
    match attributes.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::database(format!(
            "attribute {name:?} is {}, expected a string",
            json_type_name(other)
        ))),
        None => Err(Error::database(format!("missing attribute {name:?}"))),
    }
}

/// Extract a row-version attribute
///
/// # Errors
/// [`Error::Database`] if the attribute is missing, not a non-negative
/// integer, or zero (stored versions start at 1).
pub fn get_version(attributes: &AttributeMap, name: &str) -> Result<u64> {
    let version = match attributes.get(name) {
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
            Error::database(format!("attribute {name:?} is not a non-negative integer"))
        })?,
        Some(other) => {
            return Err(Error::database(format!(
                "attribute {name:?} is {}, expected a number",
                json_type_name(other)
            )))
        }
        None => return Err(Error::database(format!("missing attribute {name:?}"))),
    };
    if version == 0 {
        return Err(Error::database(format!(
            "attribute {name:?} is 0, stored versions start at 1"
        )));
    }
    Ok(version)
}

/// Extract an RFC 3339 timestamp attribute
///
/// # Errors
/// [`Error::Database`] if the attribute is missing, not a string, or not a
/// valid RFC 3339 datetime.
pub fn get_timestamp(attributes: &AttributeMap, name: &str) -> Result<Timestamp> {
    let raw = get_string(attributes, name)?;
    Timestamp::parse(raw)
        .map_err(|e| Error::database(format!("attribute {name:?} is not a valid timestamp: {e}")))
}

/// Human-readable name for a JSON value's type, for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
