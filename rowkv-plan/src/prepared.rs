//! Open-time plan validation and compilation.
//!
//! [`prepare`] performs every check the operation boundary promises: index
//! domains, operator/category agreement, result schema arity and types. A
//! [`PreparedPlan`] that comes back `Ok` runs without further validation.

use rowkv_expr::Expr;
use rowkv_result::{Error, Result};
use rowkv_types::{ColumnDescriptor, ColumnType, Schema};

use crate::plans::{AggregationType, CoprocessorPlan, SchemaSpec};

/// Execution mode, determined by which plan lists are non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Empty original schema: rows stream through untouched, not decoded.
    Raw,
    /// No grouping, no aggregation: one output row per input row.
    PassThrough,
    /// Grouping without aggregation: each distinct group key emitted once.
    GroupOnly,
    /// Aggregation without grouping: one implicit group, one output row.
    AggregateOnly,
    /// Grouping and aggregation combined.
    GroupAggregate,
}

/// One validated aggregation slot.
#[derive(Debug, Clone)]
pub struct PreparedAggregation {
    pub oper: AggregationType,
    /// Projected-tuple input index; `None` is the "no column" sentinel and
    /// feeds a virtual null every row.
    pub input: Option<usize>,
    /// Type of the input column, `None` for the sentinel.
    pub input_type: Option<ColumnType>,
    /// Declared (and verified) result type of this slot.
    pub output_type: ColumnType,
}

/// A validated, compiled plan.
#[derive(Debug, Clone)]
pub struct PreparedPlan {
    pub original: Schema,
    pub result: Schema,
    /// Projected-index selection; empty means identity.
    pub selection: Vec<usize>,
    /// For each projected column, the original logical index it came from.
    pub proj_source: Vec<usize>,
    /// Type of each projected column.
    pub projected_types: Vec<ColumnType>,
    pub group_by: Vec<usize>,
    pub aggregations: Vec<PreparedAggregation>,
    pub filter: Option<Expr<usize>>,
    pub mode: ExecMode,
}

impl PreparedPlan {
    /// Whether executing this plan reads any non-key original column.
    ///
    /// When false, the value part of each input row never needs decoding
    /// and a `key_only` scan is sufficient.
    pub fn uses_non_key_columns(&self) -> bool {
        let mut used: Vec<usize> = match self.mode {
            ExecMode::Raw => return false,
            ExecMode::PassThrough => (0..self.proj_source.len()).collect(),
            ExecMode::GroupOnly => self.group_by.clone(),
            ExecMode::AggregateOnly => self.aggregations.iter().filter_map(|a| a.input).collect(),
            ExecMode::GroupAggregate => {
                let mut v = self.group_by.clone();
                v.extend(self.aggregations.iter().filter_map(|a| a.input));
                v
            }
        };
        if let Some(filter) = &self.filter {
            filter.for_each_field(&mut |&f| used.push(f));
        }
        used.iter()
            .any(|&proj| !self.original.column(self.proj_source[proj]).is_key)
    }
}

fn build_schema(spec: &SchemaSpec, version: u32) -> Result<Schema> {
    let mut columns = Vec::with_capacity(spec.columns.len());
    for (logical, col) in spec.columns.iter().enumerate() {
        let index = usize::try_from(col.index).map_err(|_| {
            Error::InvalidPlan(format!(
                "column {logical} has negative physical index {}",
                col.index
            ))
        })?;
        columns.push(ColumnDescriptor::new(
            col.column_type,
            col.is_key,
            col.is_nullable,
            index,
        ));
    }
    Schema::new(spec.common_id, version, columns)
}

/// Result type of `SUM`/`SUM0` over an input column type.
fn promote_sum(input: ColumnType) -> Result<ColumnType> {
    match input {
        ColumnType::Bool | ColumnType::Int32 | ColumnType::Int64 => Ok(ColumnType::Int64),
        ColumnType::Float32 | ColumnType::Float64 => Ok(ColumnType::Float64),
        ColumnType::String => Err(Error::TypeMismatch(
            "SUM is not defined over string columns".to_string(),
        )),
    }
}

/// Validate `plan` and compile it for execution.
pub fn prepare(plan: &CoprocessorPlan) -> Result<PreparedPlan> {
    if plan.schema_version == 0 {
        return Err(Error::InvalidPlan(
            "schema_version must be positive".to_string(),
        ));
    }

    let original = build_schema(&plan.original_schema, plan.schema_version)?;
    let result = build_schema(&plan.result_schema, plan.schema_version)?;

    // A degenerate plan with no original schema streams raw rows through.
    if original.is_empty() {
        if !plan.selection_columns.is_empty()
            || !plan.group_by_columns.is_empty()
            || !plan.aggregation_operators.is_empty()
            || plan.filter.is_some()
            || !result.is_empty()
        {
            return Err(Error::InvalidPlan(
                "empty original schema admits no projection, filter, or aggregation".to_string(),
            ));
        }
        return Ok(PreparedPlan {
            original,
            result,
            selection: Vec::new(),
            proj_source: Vec::new(),
            projected_types: Vec::new(),
            group_by: Vec::new(),
            aggregations: Vec::new(),
            filter: None,
            mode: ExecMode::Raw,
        });
    }

    if result.is_empty() {
        return Err(Error::InvalidPlan("result schema is empty".to_string()));
    }
    if original.common_id() != result.common_id() {
        return Err(Error::InvalidPlan(format!(
            "original schema describes table {}, result schema table {}",
            original.common_id(),
            result.common_id()
        )));
    }

    let mut selection = Vec::with_capacity(plan.selection_columns.len());
    for &raw in &plan.selection_columns {
        let logical = usize::try_from(raw)
            .ok()
            .filter(|&i| i < original.len())
            .ok_or_else(|| {
                Error::IndexOutOfRange(format!(
                    "selection column {raw} not in [0, {})",
                    original.len()
                ))
            })?;
        selection.push(logical);
    }

    // An empty selection is the identity projection over the original schema.
    let proj_source: Vec<usize> = if selection.is_empty() {
        (0..original.len()).collect()
    } else {
        selection.clone()
    };
    let projected_types: Vec<ColumnType> = proj_source
        .iter()
        .map(|&i| original.column(i).column_type)
        .collect();

    let mut group_by = Vec::with_capacity(plan.group_by_columns.len());
    for &raw in &plan.group_by_columns {
        let proj = usize::try_from(raw)
            .ok()
            .filter(|&i| i < proj_source.len())
            .ok_or_else(|| {
                Error::IndexOutOfRange(format!(
                    "group-by column {raw} not in [0, {})",
                    proj_source.len()
                ))
            })?;
        group_by.push(proj);
    }

    let mut aggregations = Vec::with_capacity(plan.aggregation_operators.len());
    for agg in &plan.aggregation_operators {
        let input = usize::try_from(agg.index_of_column)
            .ok()
            .filter(|&i| i < proj_source.len());
        let input_type = input.map(|i| projected_types[i]);
        if matches!(agg.oper, AggregationType::Sum | AggregationType::Sum0) {
            if let Some(ty) = input_type {
                promote_sum(ty)?;
            }
        }
        aggregations.push(PreparedAggregation {
            oper: agg.oper,
            input,
            input_type,
            // Patched below once the result schema position is known.
            output_type: ColumnType::Int64,
        });
    }

    let mode = match (!group_by.is_empty(), !aggregations.is_empty()) {
        (false, false) => ExecMode::PassThrough,
        (true, false) => ExecMode::GroupOnly,
        (false, true) => ExecMode::AggregateOnly,
        (true, true) => ExecMode::GroupAggregate,
    };

    let expected_result_len = match mode {
        ExecMode::Raw => unreachable!("raw mode returned above"),
        ExecMode::PassThrough => proj_source.len(),
        ExecMode::GroupOnly => group_by.len(),
        ExecMode::AggregateOnly => aggregations.len(),
        ExecMode::GroupAggregate => group_by.len() + aggregations.len(),
    };
    if result.len() != expected_result_len {
        return Err(Error::InvalidPlan(format!(
            "result schema has {} columns, plan produces {expected_result_len}",
            result.len()
        )));
    }

    // Group-key result columns carry the projected column's type through.
    let group_out = match mode {
        ExecMode::GroupOnly | ExecMode::GroupAggregate => group_by.len(),
        _ => 0,
    };
    match mode {
        ExecMode::PassThrough => {
            for (k, &ty) in projected_types.iter().enumerate() {
                let declared = result.column(k).column_type;
                if declared != ty {
                    return Err(Error::InvalidPlan(format!(
                        "result column {k} declared {declared:?}, projection produces {ty:?}"
                    )));
                }
            }
        }
        ExecMode::GroupOnly | ExecMode::GroupAggregate => {
            for (k, &proj) in group_by.iter().enumerate() {
                let declared = result.column(k).column_type;
                let produced = projected_types[proj];
                if declared != produced {
                    return Err(Error::InvalidPlan(format!(
                        "result column {k} declared {declared:?}, group key produces {produced:?}"
                    )));
                }
            }
        }
        _ => {}
    }
    for (k, agg) in aggregations.iter_mut().enumerate() {
        let declared_col = result.column(group_out + k);
        let declared = declared_col.column_type;
        let expected = match agg.oper {
            AggregationType::Count | AggregationType::CountWithNull => Some(ColumnType::Int64),
            AggregationType::Sum | AggregationType::Sum0 => match agg.input_type {
                Some(ty) => Some(promote_sum(ty)?),
                // Sentinel input: the sum never observes a value, but its
                // declared slot must still be a summable type.
                None => {
                    if !declared.is_summable() {
                        return Err(Error::TypeMismatch(
                            "SUM result column must be numeric".to_string(),
                        ));
                    }
                    None
                }
            },
            AggregationType::Max | AggregationType::Min => match agg.input_type {
                Some(ty) => Some(ty),
                // Sentinel input: the extreme never observes a value and
                // always emits null, so the declared slot must be nullable.
                // Any column type can hold that null.
                None => {
                    if !declared_col.is_nullable {
                        return Err(Error::InvalidPlan(format!(
                            "result column {} for {:?} over no column must be nullable",
                            group_out + k,
                            agg.oper
                        )));
                    }
                    None
                }
            },
        };
        if let Some(expected) = expected {
            if declared != expected {
                return Err(Error::InvalidPlan(format!(
                    "result column {} declared {declared:?}, {:?} produces {expected:?}",
                    group_out + k,
                    agg.oper
                )));
            }
        }
        agg.output_type = declared;
    }

    if let Some(filter) = &plan.filter {
        validate_filter(filter, &projected_types)?;
    }

    Ok(PreparedPlan {
        original,
        result,
        selection,
        proj_source,
        projected_types,
        group_by,
        aggregations,
        filter: plan.filter.clone(),
        mode,
    })
}

fn validate_filter(expr: &Expr<usize>, projected_types: &[ColumnType]) -> Result<()> {
    match expr {
        Expr::And(children) | Expr::Or(children) => {
            for child in children {
                validate_filter(child, projected_types)?;
            }
            Ok(())
        }
        Expr::Not(child) => validate_filter(child, projected_types),
        Expr::Pred(filter) => {
            let ty = projected_types.get(filter.field).ok_or_else(|| {
                Error::IndexOutOfRange(format!(
                    "filter column {} not in [0, {})",
                    filter.field,
                    projected_types.len()
                ))
            })?;
            match filter.op.literal() {
                Some(lit) if !lit.matches(*ty) => Err(Error::TypeMismatch(format!(
                    "filter literal {:?} against {ty:?} column {}",
                    lit.column_type(),
                    filter.field
                ))),
                _ => Ok(()),
            }
        }
    }
}
