//! Plan structures describing one coprocessor configuration.
//!
//! These are plain data: they are created by the RPC layer (or test
//! harnesses) and consumed by [`crate::prepare`]. Indices are `i32` as on
//! the wire; negative or past-the-end aggregation indices are the legal
//! "no column" sentinel.

use rowkv_expr::Expr;
use rowkv_types::{ColumnType, CommonId};

/// Aggregation operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationType {
    Sum,
    Count,
    CountWithNull,
    Max,
    Min,
    /// Like [`AggregationType::Sum`] but an all-null group yields `0`
    /// instead of null.
    Sum0,
}

/// One aggregation slot: operator plus its input column.
///
/// `index_of_column` addresses the *projected* tuple. Any negative value or
/// any value at or past the projected length means "no column": the
/// accumulator observes a virtual null on every input row, which is how
/// `COUNT(*)` is expressed (`COUNT_WITH_NULL` over the sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationExpr {
    pub oper: AggregationType,
    pub index_of_column: i32,
}

impl AggregationExpr {
    pub fn new(oper: AggregationType, index_of_column: i32) -> Self {
        Self {
            oper,
            index_of_column,
        }
    }
}

/// Wire-shape column descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column_type: ColumnType,
    pub is_key: bool,
    pub is_nullable: bool,
    /// Physical index: the column's position in the serialized tuple.
    pub index: i32,
}

impl ColumnSpec {
    pub fn new(column_type: ColumnType, is_key: bool, is_nullable: bool, index: i32) -> Self {
        Self {
            column_type,
            is_key,
            is_nullable,
            index,
        }
    }
}

/// Wire-shape schema: table identity plus ordered column descriptors.
#[derive(Debug, Clone, Default)]
pub struct SchemaSpec {
    pub common_id: CommonId,
    pub columns: Vec<ColumnSpec>,
}

impl SchemaSpec {
    pub fn new(common_id: CommonId) -> Self {
        Self {
            common_id,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }
}

/// The fully specified plan a coprocessor instance executes.
///
/// Empty `selection_columns` means identity projection (full row out);
/// empty `group_by_columns` and `aggregation_operators` select pass-through
/// mode. The optional filter runs between selection and aggregation and
/// addresses the projected tuple.
#[derive(Debug, Clone, Default)]
pub struct CoprocessorPlan {
    pub schema_version: u32,
    pub original_schema: SchemaSpec,
    pub selection_columns: Vec<i32>,
    pub result_schema: SchemaSpec,
    pub group_by_columns: Vec<i32>,
    pub aggregation_operators: Vec<AggregationExpr>,
    pub filter: Option<Expr<usize>>,
}

impl CoprocessorPlan {
    pub fn new(schema_version: u32) -> Self {
        Self {
            schema_version,
            ..Default::default()
        }
    }

    pub fn with_original_schema(mut self, schema: SchemaSpec) -> Self {
        self.original_schema = schema;
        self
    }

    pub fn with_selection(mut self, columns: Vec<i32>) -> Self {
        self.selection_columns = columns;
        self
    }

    pub fn with_result_schema(mut self, schema: SchemaSpec) -> Self {
        self.result_schema = schema;
        self
    }

    pub fn with_group_by(mut self, columns: Vec<i32>) -> Self {
        self.group_by_columns = columns;
        self
    }

    pub fn with_aggregations(mut self, aggregations: Vec<AggregationExpr>) -> Self {
        self.aggregation_operators = aggregations;
        self
    }

    pub fn with_filter(mut self, filter: Expr<usize>) -> Self {
        self.filter = Some(filter);
        self
    }
}
