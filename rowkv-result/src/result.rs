use crate::error::Error;

/// Result type alias used throughout rowkv.
///
/// Shorthand for `std::result::Result<T, Error>`. All rowkv operations that
/// can fail should return this type.
pub type Result<T> = std::result::Result<T, Error>;
