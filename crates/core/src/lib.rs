//! Core contract types for keyrow
//!
//! This crate defines the foundational types used throughout the system:
//! - CompositePrimaryKey / RowIdentity: two-part keys and their attribute
//!   naming policy
//! - RowStatus / TypedRow: the versioned row contract
//! - RowWithItemVersion / RowWithIndex: payload wrapper patterns
//! - Timestamp: RFC 3339 timestamps for row metadata
//! - keypath: sort-key path composition helpers
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod key;
pub mod keypath;
pub mod row;
pub mod timestamp;
pub mod wrappers;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
pub use key::{CompositePrimaryKey, RowIdentity, StandardRowIdentity};
pub use keypath::{
    compose_key, compose_versioned_key, versioned_key_prefix, KeyPathError,
    DEFAULT_VERSION_PAD_WIDTH, KEY_SEGMENT_SEPARATOR,
};
pub use row::{RowStatus, TypedRow};
pub use timestamp::Timestamp;
pub use wrappers::{IndexIdentity, RowWithIndex, RowWithItemVersion, ITEM_VERSION_ATTRIBUTE};
