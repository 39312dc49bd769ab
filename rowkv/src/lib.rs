//! rowkv: the pushdown coprocessor of an ordered key/value storage node.
//!
//! This crate is the workspace's single entry point: it re-exports the
//! public surface of the underlying `rowkv-*` crates so downstream code
//! sees one coherent API for plans, codecs, storage, and execution.
//!
//! Given a scan range over an encoded table, the coprocessor projects a
//! subset of columns, optionally filters, applies per-group aggregation,
//! and returns a stream of rows re-encoded under a declared result schema,
//! so that only reduced tuples cross the network.
//!
//! The layers, bottom up:
//!
//! - [`rowkv_types`]: column types, value cells, and schemas with their
//!   logical/physical index mapping.
//! - [`rowkv_codec`]: the record codec. Key bytes are order-preserving and
//!   memcmp-comparable; value bytes are compact and length-prefixed.
//! - [`rowkv_storage`]: the iterator contract consumed by execution, plus
//!   an ordered in-memory engine for tests and demos.
//! - [`rowkv_expr`] and [`rowkv_plan`]: filter expressions and the
//!   declarative plan with its open-time validation.
//! - [`rowkv_aggregate`] and [`rowkv_coprocessor`]: accumulators and the
//!   budgeted execution loop.

#![forbid(unsafe_code)]

pub use rowkv_aggregate::{Accumulator, AccumulatorSet};
pub use rowkv_codec::{RecordDecoder, RecordEncoder, table_prefix};
pub use rowkv_coprocessor::{
    Coprocessor, CoprocessorConfig, DecodeErrorPolicy, ExecuteBatch, ExecuteOptions,
};
pub use rowkv_expr::{Expr, Filter, Operator};
pub use rowkv_plan::{
    AggregationExpr, AggregationType, ColumnSpec, CoprocessorPlan, ExecMode, PreparedPlan,
    SchemaSpec, prepare,
};
pub use rowkv_result::{Error, Result};
pub use rowkv_storage::{IterOptions, KeyValue, MemEngine, RawIterator, prefix_next};
pub use rowkv_types::{ColumnDescriptor, ColumnType, Schema, Tuple, Value};
