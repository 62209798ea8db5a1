//! Table layer for keyrow
//!
//! This crate implements the storage-facing half of the system:
//! - AttributeMap: the flat attribute-map representation of stored rows
//! - encode_item / decode_item / decode_polymorphic_item: the row codec
//! - SortKeyCondition / ScanOrder: partition query conditions
//! - Table: the capability interface any backing store implements
//! - InMemoryTable: the reference implementation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod codec;
pub mod condition;
pub mod memory;
pub mod table;

pub use attributes::{
    AttributeMap, CREATE_DATE_ATTRIBUTE, LAST_UPDATED_ATTRIBUTE, ROW_TYPE_ATTRIBUTE,
    ROW_VERSION_ATTRIBUTE,
};
pub use codec::{decode_item, decode_polymorphic_item, encode_item, ItemPayload, PolymorphicRow};
pub use condition::{ScanOrder, SortKeyCondition};
pub use memory::InMemoryTable;
pub use table::{PageToken, QueryPage, Table};
