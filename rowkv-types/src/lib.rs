//! Core data-model types shared across the rowkv workspace.
//!
//! A [`Schema`] describes a table's columns twice over: the position a
//! descriptor occupies in the schema list is its *logical* index (the order
//! the query engine sees), while the descriptor's [`ColumnDescriptor::index`]
//! is its *physical* index (the position the column occupies in the
//! serialized tuple). The two orders need not agree; the record codec is the
//! only place the mapping is applied, every other component addresses
//! columns logically.

#![forbid(unsafe_code)]

pub mod schema;
pub mod value;

pub use schema::{ColumnDescriptor, Schema};
pub use value::{ColumnType, Tuple, Value, compare_values};

/// Logical table identifier embedded in every encoded key.
pub type CommonId = i64;

/// Monotone schema version; two schemas are compatible only if versions match.
pub type SchemaVersion = u32;
