use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all rowkv operations.
///
/// This enum encompasses every failure mode across the rowkv stack, from
/// corrupt encoded rows to invalid plans. Each variant carries
/// context-specific information to help diagnose and handle the error
/// appropriately.
///
/// # Error Handling Strategy
///
/// Errors propagate upward through the call stack using Rust's `?`
/// operator and are reported at the operation boundary (`open` or
/// `execute`), never stashed for later. At the RPC boundary each variant
/// maps to an error-code + message pair. Internal code can match on
/// specific variants for fine-grained error handling. The coprocessor
/// never retries; the caller decides whether to retry with a different
/// plan or a smaller range.
///
/// # Thread Safety
///
/// `Error` implements `Send` and `Sync`, allowing errors to be safely
/// passed between threads. This matters because region-level parallelism
/// runs independent coprocessor instances on different worker threads.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error surfaced by the underlying engine's read path.
    ///
    /// This error wraps standard library I/O errors and typically occurs
    /// during:
    /// - Reading a block while the scan iterator advances
    /// - Faulting in data on the engine's synchronous read path
    ///
    /// The underlying `io::Error` provides detailed information about the
    /// failure (e.g. permission denied, unexpected end of file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Tuple shape disagrees with its schema.
    ///
    /// This error occurs when:
    /// - A tuple's value count differs from the schema's column count
    /// - A non-nullable column holds a null
    /// - A null reaches the key encoder for a non-nullable key column
    ///
    /// # Recovery
    ///
    /// Fatal for the call. The tuple (or the schema describing it) must be
    /// corrected by the caller before the operation is attempted again.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// An operator, literal, or cell has the wrong type category.
    ///
    /// This error occurs when:
    /// - An aggregation operator is applied to a column of the wrong
    ///   category (e.g. `SUM` over a string column)
    /// - A filter literal's type disagrees with the column it compares
    ///   against
    /// - A cell's dynamic tag disagrees with the declared column type at
    ///   encode time
    ///
    /// Plan-level disagreements are detected at `open`; cell-level
    /// disagreements surface at encode time.
    ///
    /// # Recovery
    ///
    /// Fatal at `open`. Fix the plan (or the data producer) and re-open.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A selection, group-by, or filter index exceeds its domain.
    ///
    /// This error occurs when:
    /// - A selection column index is at or past the original schema length
    /// - A group-by index is at or past the projected tuple length
    /// - A filter references a projected column that does not exist
    ///
    /// An aggregation's `index_of_column` is exempt: a negative or
    /// past-the-end value there is the legal "no column" sentinel, not an
    /// error.
    ///
    /// # Recovery
    ///
    /// Fatal at `open`. The plan references columns that do not exist and
    /// must be rebuilt.
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    /// Integer aggregation left the 64-bit representable range.
    ///
    /// This error occurs when:
    /// - A running integer `SUM`/`SUM0` total cannot be narrowed to `i64`
    ///   at finalize, when the result row is encoded
    ///
    /// The message names the offending group. Float sums follow IEEE-754
    /// (infinities are valid results) and never raise this.
    ///
    /// # Recovery
    ///
    /// Fatal for the call. The caller can retry over a smaller range so
    /// that per-group totals stay representable.
    #[error("integer overflow: {0}")]
    Overflow(String),

    /// An encoded row is corrupt or incompatible with the open schema.
    ///
    /// This error occurs when:
    /// - Key or value bytes are truncated mid-column
    /// - A null marker or string group marker byte is out of range
    /// - String padding bytes are nonzero
    /// - A row carries a different table id or schema version than the
    ///   schema decoding it
    /// - Trailing bytes remain after every column was decoded
    ///
    /// # Recovery
    ///
    /// Fatal for the call by default. A coprocessor constructed with the
    /// lenient decode policy instead logs a warning and skips the row.
    #[error("decode error: {0}")]
    Decode(String),

    /// A buffering ceiling was exceeded.
    ///
    /// This error occurs when:
    /// - The group-by map grows past the configured maximum number of
    ///   distinct groups during one scan
    ///
    /// The call fails rather than letting the only unbounded allocation in
    /// the pipeline grow until the process is killed.
    ///
    /// # Recovery
    ///
    /// Fatal for the call. Retry over a smaller range, or reconfigure the
    /// instance with a higher ceiling.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Any open-time plan validation failure not covered by a more
    /// specific variant.
    ///
    /// This error occurs when:
    /// - `schema_version` is zero
    /// - The original and result schemas name different tables
    /// - The result schema's arity disagrees with what the plan produces
    /// - A result column's type disagrees with the producing operator's
    ///   output type
    /// - A physical index is negative, duplicated, or out of range
    ///
    /// # Recovery
    ///
    /// Fatal at `open`. The plan must be rebuilt by its producer.
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// This error should never occur during normal operation. It
    /// indicates:
    /// - Violated internal invariants (e.g. a validated plan disagreeing
    ///   with the tuples it runs over)
    /// - `execute` called on an instance with no open plan
    /// - Unexpected state transitions
    ///
    /// # Debugging
    ///
    /// The message includes details about what invariant was violated.
    /// If you encounter this error, it likely indicates a bug in rowkv
    /// that should be reported with reproduction steps.
    #[error("an internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a decode error from any displayable error.
    ///
    /// This is a convenience method for converting other error types into
    /// [`Error::Decode`] while preserving the original error message.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowkv_result::Error;
    ///
    /// fn read_header_byte(bytes: &[u8]) -> Result<u8, Error> {
    ///     bytes
    ///         .first()
    ///         .copied()
    ///         .ok_or_else(|| Error::decode("key shorter than header"))
    /// }
    ///
    /// assert_eq!(read_header_byte(&[0x74]).unwrap(), 0x74);
    /// assert!(matches!(read_header_byte(&[]), Err(Error::Decode(_))));
    /// ```
    #[inline]
    pub fn decode<E: fmt::Display>(err: E) -> Self {
        Error::Decode(err.to_string())
    }

    /// Create an invalid-plan error from any displayable error.
    ///
    /// This is a convenience method for converting other error types into
    /// [`Error::InvalidPlan`] while preserving the original error message.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowkv_result::Error;
    ///
    /// fn require_version(version: u32) -> Result<(), Error> {
    ///     if version == 0 {
    ///         return Err(Error::invalid_plan("schema_version must be positive"));
    ///     }
    ///     Ok(())
    /// }
    ///
    /// assert!(require_version(1).is_ok());
    /// assert!(matches!(require_version(0), Err(Error::InvalidPlan(_))));
    /// ```
    #[inline]
    pub fn invalid_plan<E: fmt::Display>(err: E) -> Self {
        Error::InvalidPlan(err.to_string())
    }
}
