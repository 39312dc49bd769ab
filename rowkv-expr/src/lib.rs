//! Scalar filter predicates over tuples.
#![forbid(unsafe_code)]

pub mod eval;
pub mod expr;

pub use eval::eval_expr;
pub use expr::{Expr, Filter, Operator};
