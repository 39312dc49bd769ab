//! Predicate AST over tuple columns.

use rowkv_types::Value;

/// Logical expression over predicates.
///
/// `F` is the field addressing scheme; the coprocessor instantiates it with
/// `usize` indices into the projected tuple.
#[derive(Clone, Debug)]
pub enum Expr<F> {
    And(Vec<Expr<F>>),
    Or(Vec<Expr<F>>),
    Not(Box<Expr<F>>),
    Pred(Filter<F>),
}

impl<F> Expr<F> {
    /// Build an AND of filters.
    #[inline]
    pub fn all_of(fs: Vec<Filter<F>>) -> Expr<F> {
        Expr::And(fs.into_iter().map(Expr::Pred).collect())
    }

    /// Build an OR of filters.
    #[inline]
    pub fn any_of(fs: Vec<Filter<F>>) -> Expr<F> {
        Expr::Or(fs.into_iter().map(Expr::Pred).collect())
    }

    /// Wrap an expression in a logical NOT.
    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn not(e: Expr<F>) -> Expr<F> {
        Expr::Not(Box::new(e))
    }

    /// Visit every field referenced by the expression.
    pub fn for_each_field(&self, f: &mut impl FnMut(&F)) {
        match self {
            Expr::And(children) | Expr::Or(children) => {
                for child in children {
                    child.for_each_field(f);
                }
            }
            Expr::Not(child) => child.for_each_field(f),
            Expr::Pred(filter) => f(&filter.field),
        }
    }
}

/// Single predicate against a field.
#[derive(Clone, Debug)]
pub struct Filter<F> {
    pub field: F,
    pub op: Operator,
}

/// Comparison and null-test operators.
///
/// Ordering comparisons carry a literal [`Value`]; a comparison whose column
/// cell or literal is null evaluates to false, `IsNull`/`IsNotNull` are the
/// explicit null tests.
#[derive(Clone, Debug)]
pub enum Operator {
    Equals(Value),
    NotEquals(Value),
    LessThan(Value),
    LessThanOrEquals(Value),
    GreaterThan(Value),
    GreaterThanOrEquals(Value),
    IsNull,
    IsNotNull,
}

impl Operator {
    /// The literal this operator compares against, if any.
    pub fn literal(&self) -> Option<&Value> {
        match self {
            Operator::Equals(v)
            | Operator::NotEquals(v)
            | Operator::LessThan(v)
            | Operator::LessThanOrEquals(v)
            | Operator::GreaterThan(v)
            | Operator::GreaterThanOrEquals(v) => Some(v),
            Operator::IsNull | Operator::IsNotNull => None,
        }
    }
}
