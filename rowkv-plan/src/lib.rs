//! Declarative coprocessor plan structures and open-time validation.
//!
//! A [`CoprocessorPlan`] mirrors the wire shape handed to the storage node:
//! schemas plus selection, group-by, and aggregation lists, all addressed by
//! logical column index. [`prepare`] validates the plan and compiles it into
//! a [`PreparedPlan`] the executor can run without further checks.

#![forbid(unsafe_code)]

pub mod plans;
pub mod prepared;

pub use plans::{AggregationExpr, AggregationType, ColumnSpec, CoprocessorPlan, SchemaSpec};
pub use prepared::{ExecMode, PreparedAggregation, PreparedPlan, prepare};
