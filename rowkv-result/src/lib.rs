//! Error types and result definitions for the rowkv coprocessor stack.
//!
//! This crate provides the unified error type ([`Error`]) and result alias
//! ([`Result<T>`]) used throughout all rowkv crates. Every fallible operation
//! returns `Result<T>`; errors propagate upward with the `?` operator and are
//! reported at the operation boundary (`open` or `execute`), never stashed
//! for later.
//!
//! # Error Categories
//!
//! - **Shape errors** ([`Error::SchemaMismatch`]): a tuple disagrees with its
//!   schema (wrong arity, null in a non-nullable column).
//! - **Category errors** ([`Error::TypeMismatch`]): an operator or literal is
//!   applied to a column of the wrong type category.
//! - **Domain errors** ([`Error::IndexOutOfRange`]): a selection, group-by,
//!   or aggregation index exceeds its domain.
//! - **Arithmetic errors** ([`Error::Overflow`]): integer aggregation left
//!   the representable range.
//! - **Data errors** ([`Error::Decode`]): an encoded row is corrupt.
//! - **Capacity errors** ([`Error::ResourceExhausted`]): a buffering ceiling
//!   was exceeded.
//! - **Plan errors** ([`Error::InvalidPlan`]): any open-time validation
//!   failure not covered above.
//! - **Internal errors** ([`Error::Internal`]): violated invariants; bugs.

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
