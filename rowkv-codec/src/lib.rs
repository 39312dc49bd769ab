//! Record codec: tuples to and from `(key_bytes, value_bytes)`.
//!
//! The key part is order-preserving and memcmp-comparable; the value part is
//! length-prefixed and compact. The codec is the only component that applies
//! the logical-to-physical column mapping: it serializes columns by their
//! physical index while callers hand it tuples in logical order.

#![forbid(unsafe_code)]

pub mod record;
pub mod sortkey;
pub mod varint;

pub use record::{
    KEY_HEADER_LEN, RecordDecoder, RecordEncoder, TUPLE_NAMESPACE, encode_group_key, table_prefix,
};
