//! The pushdown coprocessor of a storage node.
//!
//! Executes a fully specified plan close to the data: decode each scanned
//! row, project a subset of columns, optionally filter, aggregate per
//! group, and re-encode result rows under the declared result schema so
//! that only reduced tuples cross the network.
//!
//! ```text
//! [ordered KV iterator] → decode → select → [filter?] → aggregate → encode
//! ```
//!
//! One instance is driven by one executor thread at a time; region-level
//! parallelism comes from independent instances on different workers.

#![forbid(unsafe_code)]

pub mod aggregator;
pub mod coprocessor;
pub mod selector;

pub use aggregator::Aggregator;
pub use coprocessor::{
    Coprocessor, CoprocessorConfig, DecodeErrorPolicy, ExecuteBatch, ExecuteOptions,
};
pub use selector::Selector;
