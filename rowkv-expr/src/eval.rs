//! Predicate evaluation against a single tuple.

use std::cmp::Ordering;

use rowkv_result::{Error, Result};
use rowkv_types::{Value, compare_values};

use crate::expr::{Expr, Filter, Operator};

/// Evaluate `expr` against a tuple, fields addressed by projected index.
///
/// Index validity and literal/column type agreement are checked at plan open,
/// so a failure here means the plan and tuple disagree: that surfaces as
/// [`Error::Internal`].
pub fn eval_expr(expr: &Expr<usize>, tuple: &[Value]) -> Result<bool> {
    match expr {
        Expr::And(children) => {
            for child in children {
                if !eval_expr(child, tuple)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::Or(children) => {
            for child in children {
                if eval_expr(child, tuple)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expr::Not(child) => Ok(!eval_expr(child, tuple)?),
        Expr::Pred(filter) => eval_filter(filter, tuple),
    }
}

fn eval_filter(filter: &Filter<usize>, tuple: &[Value]) -> Result<bool> {
    let cell = tuple.get(filter.field).ok_or_else(|| {
        Error::Internal(format!(
            "filter references projected column {} of a {}-column tuple",
            filter.field,
            tuple.len()
        ))
    })?;
    let ok = match &filter.op {
        Operator::IsNull => cell.is_null(),
        Operator::IsNotNull => !cell.is_null(),
        Operator::Equals(lit) => compare(cell, lit)? == Some(Ordering::Equal),
        Operator::NotEquals(lit) => {
            matches!(compare(cell, lit)?, Some(ord) if ord != Ordering::Equal)
        }
        Operator::LessThan(lit) => compare(cell, lit)? == Some(Ordering::Less),
        Operator::LessThanOrEquals(lit) => {
            matches!(compare(cell, lit)?, Some(Ordering::Less | Ordering::Equal))
        }
        Operator::GreaterThan(lit) => compare(cell, lit)? == Some(Ordering::Greater),
        Operator::GreaterThanOrEquals(lit) => matches!(
            compare(cell, lit)?,
            Some(Ordering::Greater | Ordering::Equal)
        ),
    };
    Ok(ok)
}

/// Compare a cell against a literal; `None` when either side is null.
fn compare(cell: &Value, lit: &Value) -> Result<Option<Ordering>> {
    if cell.is_null() || lit.is_null() {
        return Ok(None);
    }
    compare_values(cell, lit).map(Some).ok_or_else(|| {
        Error::Internal(format!(
            "filter literal {:?} does not match column cell {:?}",
            lit.column_type(),
            cell.column_type()
        ))
    })
}
