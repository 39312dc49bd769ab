//! Running aggregation state for the coprocessor.
//!
//! One [`Accumulator`] holds the per-group state of a single aggregation
//! slot; an [`AccumulatorSet`] bundles the slots of one group and feeds them
//! from projected tuples. Null semantics follow the operator table: `COUNT`,
//! `SUM`, `MAX`, and `MIN` skip nulls, `COUNT_WITH_NULL` counts them, and
//! `SUM0` turns an all-null group into a typed zero instead of null.
//!
//! Integer sums accumulate in `i128`; leaving the i64 range is only
//! detected — and reported as [`Error::Overflow`] — at finalize, when the
//! total must be narrowed for encoding. Float sums follow IEEE-754 and
//! never overflow.

#![forbid(unsafe_code)]

use std::cmp::Ordering;

use rowkv_plan::{AggregationType, PreparedAggregation};
use rowkv_result::{Error, Result};
use rowkv_types::{ColumnType, Value, compare_values};

/// Per-slot running state.
#[derive(Debug, Clone)]
pub enum Accumulator {
    Count {
        value: i64,
    },
    CountWithNull {
        value: i64,
    },
    SumInt {
        total: i128,
        seen: bool,
        emit_zero: bool,
        output: ColumnType,
    },
    SumFloat {
        total: f64,
        seen: bool,
        emit_zero: bool,
        output: ColumnType,
    },
    Extreme {
        want_max: bool,
        current: Option<Value>,
    },
}

impl Accumulator {
    /// Create the accumulator for one aggregation slot.
    ///
    /// `input_type` is `None` for the sentinel "no column" configuration;
    /// the slot then sees only virtual nulls and the declared `output_type`
    /// alone determines the result shape.
    pub fn new(
        oper: AggregationType,
        input_type: Option<ColumnType>,
        output_type: ColumnType,
    ) -> Result<Self> {
        match oper {
            AggregationType::Count => Ok(Accumulator::Count { value: 0 }),
            AggregationType::CountWithNull => Ok(Accumulator::CountWithNull { value: 0 }),
            AggregationType::Sum | AggregationType::Sum0 => {
                let emit_zero = oper == AggregationType::Sum0;
                match input_type.unwrap_or(output_type) {
                    ColumnType::Bool | ColumnType::Int32 | ColumnType::Int64 => {
                        Ok(Accumulator::SumInt {
                            total: 0,
                            seen: false,
                            emit_zero,
                            output: output_type,
                        })
                    }
                    ColumnType::Float32 | ColumnType::Float64 => Ok(Accumulator::SumFloat {
                        total: 0.0,
                        seen: false,
                        emit_zero,
                        output: output_type,
                    }),
                    ColumnType::String => Err(Error::TypeMismatch(
                        "SUM is not defined over string columns".to_string(),
                    )),
                }
            }
            AggregationType::Max => Ok(Accumulator::Extreme {
                want_max: true,
                current: None,
            }),
            AggregationType::Min => Ok(Accumulator::Extreme {
                want_max: false,
                current: None,
            }),
        }
    }

    /// Fold one input cell into the running state.
    pub fn update(&mut self, cell: &Value) -> Result<()> {
        match self {
            Accumulator::Count { value } => {
                if !cell.is_null() {
                    *value += 1;
                }
            }
            Accumulator::CountWithNull { value } => {
                *value += 1;
            }
            Accumulator::SumInt { total, seen, .. } => {
                let addend = match cell {
                    Value::Null => return Ok(()),
                    Value::Bool(b) => *b as i128,
                    Value::Int32(v) => *v as i128,
                    Value::Int64(v) => *v as i128,
                    other => {
                        return Err(Error::Internal(format!(
                            "integer sum fed a {:?} cell",
                            other.column_type()
                        )));
                    }
                };
                *total += addend;
                *seen = true;
            }
            Accumulator::SumFloat { total, seen, .. } => {
                let addend = match cell {
                    Value::Null => return Ok(()),
                    Value::Float32(v) => *v as f64,
                    Value::Float64(v) => *v,
                    other => {
                        return Err(Error::Internal(format!(
                            "float sum fed a {:?} cell",
                            other.column_type()
                        )));
                    }
                };
                *total += addend;
                *seen = true;
            }
            Accumulator::Extreme { want_max, current } => {
                if cell.is_null() {
                    return Ok(());
                }
                match current {
                    None => *current = Some(cell.clone()),
                    Some(best) => {
                        let ord = compare_values(cell, best).ok_or_else(|| {
                            Error::Internal(format!(
                                "extreme over mixed cell types {:?} and {:?}",
                                cell.column_type(),
                                best.column_type()
                            ))
                        })?;
                        let better = if *want_max {
                            ord == Ordering::Greater
                        } else {
                            ord == Ordering::Less
                        };
                        if better {
                            *best = cell.clone();
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Produce the slot's result cell.
    pub fn finalize(&self) -> Result<Value> {
        match self {
            Accumulator::Count { value } | Accumulator::CountWithNull { value } => {
                Ok(Value::Int64(*value))
            }
            Accumulator::SumInt {
                total,
                seen,
                emit_zero,
                output,
            } => {
                if !*seen {
                    return if *emit_zero {
                        zero_of(*output)
                    } else {
                        Ok(Value::Null)
                    };
                }
                let narrowed = i64::try_from(*total)
                    .map_err(|_| Error::Overflow(format!("integer sum {total} exceeds i64")))?;
                Ok(Value::Int64(narrowed))
            }
            Accumulator::SumFloat {
                total,
                seen,
                emit_zero,
                output,
            } => {
                if !*seen {
                    return if *emit_zero {
                        zero_of(*output)
                    } else {
                        Ok(Value::Null)
                    };
                }
                Ok(Value::Float64(*total))
            }
            Accumulator::Extreme { current, .. } => {
                Ok(current.clone().unwrap_or(Value::Null))
            }
        }
    }
}

fn zero_of(ty: ColumnType) -> Result<Value> {
    match ty {
        ColumnType::Bool => Ok(Value::Bool(false)),
        ColumnType::Int32 => Ok(Value::Int32(0)),
        ColumnType::Int64 => Ok(Value::Int64(0)),
        ColumnType::Float32 => Ok(Value::Float32(0.0)),
        ColumnType::Float64 => Ok(Value::Float64(0.0)),
        ColumnType::String => Err(Error::Internal(
            "string column cannot hold a sum result".to_string(),
        )),
    }
}

/// The accumulators of one group, with their projected input indices.
#[derive(Debug, Clone)]
pub struct AccumulatorSet {
    slots: Vec<(Option<usize>, Accumulator)>,
}

impl AccumulatorSet {
    pub fn new(aggregations: &[PreparedAggregation]) -> Result<Self> {
        let mut slots = Vec::with_capacity(aggregations.len());
        for agg in aggregations {
            let acc = Accumulator::new(agg.oper, agg.input_type, agg.output_type)?;
            slots.push((agg.input, acc));
        }
        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Fold one projected tuple into every slot.
    ///
    /// Sentinel slots receive a virtual null.
    pub fn update(&mut self, projected: &[Value]) -> Result<()> {
        for (input, acc) in &mut self.slots {
            let cell = match input {
                Some(i) => &projected[*i],
                None => &Value::Null,
            };
            acc.update(cell)?;
        }
        Ok(())
    }

    /// Append every slot's result to `out`.
    pub fn finalize_into(&self, out: &mut Vec<Value>) -> Result<()> {
        for (_, acc) in &self.slots {
            out.push(acc.finalize()?);
        }
        Ok(())
    }
}
