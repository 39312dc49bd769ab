//! Tuple encoding to and from `(key_bytes, value_bytes)`.
//!
//! Key layout:
//! `[ns(1) | common_id(8) | schema_version(4, BE) | key columns | tail(1)]`.
//! Key columns appear in ascending physical-index order; nullable columns
//! carry a one-byte null marker so that null sorts strictly before every
//! present value. The tail byte records how many string pad bytes were
//! written.
//!
//! Value layout: `[null_bitmap(⌈n/8⌉) | packed fields]` over the non-key
//! columns in ascending physical-index order. Fixed-width fields are
//! little-endian; strings are `varint(len) || bytes`; null columns
//! contribute no packed bytes.

use rowkv_result::{Error, Result};
use rowkv_types::{ColumnType, CommonId, Schema, SchemaVersion, Tuple, Value};

use crate::sortkey;
use crate::varint;

/// Namespace byte prefixing every encoded table tuple.
pub const TUPLE_NAMESPACE: u8 = b't';

/// Bytes in the fixed key header: namespace, common id, schema version.
pub const KEY_HEADER_LEN: usize = 1 + 8 + 4;

const NULL_MARKER: u8 = 0x00;
const PRESENT_MARKER: u8 = 0x01;

/// The memcmp prefix shared by every row of one table at one schema version.
pub fn table_prefix(common_id: CommonId, version: SchemaVersion) -> Vec<u8> {
    let mut out = Vec::with_capacity(KEY_HEADER_LEN);
    out.push(TUPLE_NAMESPACE);
    out.extend_from_slice(&sortkey::i64_to_sort8(common_id));
    out.extend_from_slice(&version.to_be_bytes());
    out
}

/// Append the order-preserving encoding of one present cell.
///
/// Dispatches on the declared column type; the cell's dynamic tag must
/// match. Returns the number of pad bytes written (nonzero only for
/// strings).
fn encode_sort_value(dst: &mut Vec<u8>, ty: ColumnType, cell: &Value) -> Result<usize> {
    match (ty, cell) {
        (ColumnType::Bool, Value::Bool(v)) => dst.extend_from_slice(&sortkey::bool_to_sort1(*v)),
        (ColumnType::Int32, Value::Int32(v)) => dst.extend_from_slice(&sortkey::i32_to_sort4(*v)),
        (ColumnType::Int64, Value::Int64(v)) => dst.extend_from_slice(&sortkey::i64_to_sort8(*v)),
        (ColumnType::Float32, Value::Float32(v)) => {
            dst.extend_from_slice(&sortkey::f32_to_sort4(*v))
        }
        (ColumnType::Float64, Value::Float64(v)) => {
            dst.extend_from_slice(&sortkey::f64_to_sort8(*v))
        }
        (ColumnType::String, Value::String(v)) => return Ok(sortkey::encode_bytes(dst, v)),
        (expected, got) => {
            return Err(Error::TypeMismatch(format!(
                "column declared {expected:?} but cell is {:?}",
                got.column_type()
            )));
        }
    }
    Ok(0)
}

/// First `n` bytes of `src`, or a decode error naming what was truncated.
fn take<'a>(src: &'a [u8], n: usize, what: &str) -> Result<&'a [u8]> {
    src.get(..n)
        .ok_or_else(|| Error::Decode(format!("truncated {what}")))
}

fn take4(src: &[u8], what: &str) -> Result<[u8; 4]> {
    Ok(take(src, 4, what)?.try_into().expect("sliced to 4 bytes"))
}

fn take8(src: &[u8], what: &str) -> Result<[u8; 8]> {
    Ok(take(src, 8, what)?.try_into().expect("sliced to 8 bytes"))
}

/// Decode one cell of declared type `ty` from `src[pos..]`.
///
/// Returns the cell and the number of bytes consumed.
fn decode_sort_value(src: &[u8], pos: usize, ty: ColumnType) -> Result<(Value, usize)> {
    let rest = &src[pos..];
    match ty {
        ColumnType::Bool => {
            let b = take(rest, 1, "BOOL key column")?[0];
            Ok((Value::Bool(sortkey::sort1_to_bool(b)?), 1))
        }
        ColumnType::Int32 => {
            let b = take4(rest, "INT32 key column")?;
            Ok((Value::Int32(sortkey::sort4_to_i32(b)), 4))
        }
        ColumnType::Int64 => {
            let b = take8(rest, "INT64 key column")?;
            Ok((Value::Int64(sortkey::sort8_to_i64(b)), 8))
        }
        ColumnType::Float32 => {
            let b = take4(rest, "FLOAT32 key column")?;
            Ok((Value::Float32(sortkey::sort4_to_f32(b)), 4))
        }
        ColumnType::Float64 => {
            let b = take8(rest, "FLOAT64 key column")?;
            Ok((Value::Float64(sortkey::sort8_to_f64(b)), 8))
        }
        ColumnType::String => {
            let (raw, consumed) = sortkey::decode_bytes(rest)?;
            Ok((Value::String(raw), consumed))
        }
    }
}

/// Canonical byte encoding of a group-key projection.
///
/// Every column is marker-prefixed (null is a legal group-key value), then
/// sort-key encoded, so semantically equal tuples always map to identical
/// bytes regardless of in-memory representation.
pub fn encode_group_key(dst: &mut Vec<u8>, cells: &[&Value], types: &[ColumnType]) -> Result<()> {
    debug_assert_eq!(cells.len(), types.len());
    for (cell, &ty) in cells.iter().zip(types) {
        if cell.is_null() {
            dst.push(NULL_MARKER);
        } else {
            dst.push(PRESENT_MARKER);
            encode_sort_value(dst, ty, cell)?;
        }
    }
    Ok(())
}

/// Encodes tuples under one schema.
pub struct RecordEncoder<'a> {
    schema: &'a Schema,
}

impl<'a> RecordEncoder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// The scan prefix under which every row of this schema sorts.
    pub fn key_prefix(&self) -> Vec<u8> {
        table_prefix(self.schema.common_id(), self.schema.version())
    }

    /// Encode `tuple` into `(key_bytes, value_bytes)`.
    ///
    /// The tuple is validated against the schema first: wrong arity or a
    /// null in a non-nullable column is [`Error::SchemaMismatch`], a cell
    /// whose dynamic tag disagrees with the declared type is
    /// [`Error::TypeMismatch`]. Encoding is deterministic.
    pub fn encode(&self, tuple: &Tuple) -> Result<(Vec<u8>, Vec<u8>)> {
        self.schema.check_tuple(tuple)?;
        Ok((self.encode_key(tuple)?, self.encode_value(tuple)?))
    }

    fn encode_key(&self, tuple: &Tuple) -> Result<Vec<u8>> {
        let mut key = self.key_prefix();
        let mut pad_total = 0usize;
        for &logical in self.schema.key_columns() {
            let col = self.schema.column(logical);
            let cell = &tuple[logical];
            if col.is_nullable {
                if cell.is_null() {
                    key.push(NULL_MARKER);
                    continue;
                }
                key.push(PRESENT_MARKER);
            } else if cell.is_null() {
                return Err(Error::SchemaMismatch(format!(
                    "null in non-nullable key column {logical}"
                )));
            }
            pad_total += encode_sort_value(&mut key, col.column_type, cell)?;
        }
        key.push(pad_total.min(u8::MAX as usize) as u8);
        Ok(key)
    }

    fn encode_value(&self, tuple: &Tuple) -> Result<Vec<u8>> {
        let value_cols = self.schema.value_columns();
        let bitmap_len = value_cols.len().div_ceil(8);
        let mut out = vec![0u8; bitmap_len];
        for (k, &logical) in value_cols.iter().enumerate() {
            let col = self.schema.column(logical);
            let cell = &tuple[logical];
            if cell.is_null() {
                out[k / 8] |= 1 << (k % 8);
                continue;
            }
            match (col.column_type, cell) {
                (ColumnType::Bool, Value::Bool(v)) => out.push(*v as u8),
                (ColumnType::Int32, Value::Int32(v)) => out.extend_from_slice(&v.to_le_bytes()),
                (ColumnType::Int64, Value::Int64(v)) => out.extend_from_slice(&v.to_le_bytes()),
                (ColumnType::Float32, Value::Float32(v)) => {
                    out.extend_from_slice(&v.to_le_bytes())
                }
                (ColumnType::Float64, Value::Float64(v)) => {
                    out.extend_from_slice(&v.to_le_bytes())
                }
                (ColumnType::String, Value::String(v)) => {
                    varint::encode_u64(&mut out, v.len() as u64);
                    out.extend_from_slice(v);
                }
                (expected, got) => {
                    return Err(Error::TypeMismatch(format!(
                        "column {logical} declared {expected:?} but cell is {:?}",
                        got.column_type()
                    )));
                }
            }
        }
        Ok(out)
    }
}

/// Decodes tuples under one schema.
pub struct RecordDecoder<'a> {
    schema: &'a Schema,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Reconstruct the full tuple from an encoded row.
    pub fn decode(&self, key: &[u8], value: &[u8]) -> Result<Tuple> {
        let mut tuple = vec![Value::Null; self.schema.len()];
        self.decode_key_into(key, &mut tuple)?;
        self.decode_value_into(value, &mut tuple)?;
        Ok(tuple)
    }

    /// Reconstruct only the key columns; non-key cells come back null.
    pub fn decode_key_only(&self, key: &[u8]) -> Result<Tuple> {
        let mut tuple = vec![Value::Null; self.schema.len()];
        self.decode_key_into(key, &mut tuple)?;
        Ok(tuple)
    }

    fn decode_key_into(&self, key: &[u8], tuple: &mut Tuple) -> Result<()> {
        if key.len() < KEY_HEADER_LEN + 1 {
            return Err(Error::Decode("key shorter than header".to_string()));
        }
        if key[0] != TUPLE_NAMESPACE {
            return Err(Error::Decode(format!(
                "unexpected namespace byte {:#04x}",
                key[0]
            )));
        }
        let id_bytes: [u8; 8] = key[1..9].try_into().expect("sliced to 8 bytes");
        let common_id = sortkey::sort8_to_i64(id_bytes);
        if common_id != self.schema.common_id() {
            return Err(Error::Decode(format!(
                "row belongs to table {common_id}, schema describes {}",
                self.schema.common_id()
            )));
        }
        let version_bytes: [u8; 4] = key[9..13].try_into().expect("sliced to 4 bytes");
        let version = u32::from_be_bytes(version_bytes);
        if version != self.schema.version() {
            return Err(Error::Decode(format!(
                "row has schema version {version}, schema is {}",
                self.schema.version()
            )));
        }

        let mut pos = KEY_HEADER_LEN;
        for &logical in self.schema.key_columns() {
            let col = self.schema.column(logical);
            if col.is_nullable {
                let marker = *key
                    .get(pos)
                    .ok_or_else(|| Error::Decode("truncated null marker".to_string()))?;
                pos += 1;
                match marker {
                    NULL_MARKER => {
                        tuple[logical] = Value::Null;
                        continue;
                    }
                    PRESENT_MARKER => {}
                    other => {
                        return Err(Error::Decode(format!(
                            "invalid null marker {other:#04x}"
                        )));
                    }
                }
            }
            let (cell, consumed) = decode_sort_value(key, pos, col.column_type)?;
            tuple[logical] = cell;
            pos += consumed;
        }
        // A single tail byte of padding bookkeeping remains.
        if pos + 1 != key.len() {
            return Err(Error::Decode(format!(
                "key has {} trailing bytes, expected 1",
                key.len() - pos
            )));
        }
        Ok(())
    }

    fn decode_value_into(&self, value: &[u8], tuple: &mut Tuple) -> Result<()> {
        let value_cols = self.schema.value_columns();
        let bitmap_len = value_cols.len().div_ceil(8);
        if value.len() < bitmap_len {
            return Err(Error::Decode("value shorter than null bitmap".to_string()));
        }
        let (bitmap, mut rest) = value.split_at(bitmap_len);
        for (k, &logical) in value_cols.iter().enumerate() {
            if bitmap[k / 8] & (1 << (k % 8)) != 0 {
                tuple[logical] = Value::Null;
                continue;
            }
            let col = self.schema.column(logical);
            let consumed;
            match col.column_type {
                ColumnType::Bool => {
                    let b = take(rest, 1, "BOOL value column")?[0];
                    if b > 1 {
                        return Err(Error::Decode(format!("invalid bool byte {b:#04x}")));
                    }
                    tuple[logical] = Value::Bool(b != 0);
                    consumed = 1;
                }
                ColumnType::Int32 => {
                    let b = take4(rest, "INT32 value column")?;
                    tuple[logical] = Value::Int32(i32::from_le_bytes(b));
                    consumed = 4;
                }
                ColumnType::Int64 => {
                    let b = take8(rest, "INT64 value column")?;
                    tuple[logical] = Value::Int64(i64::from_le_bytes(b));
                    consumed = 8;
                }
                ColumnType::Float32 => {
                    let b = take4(rest, "FLOAT32 value column")?;
                    tuple[logical] = Value::Float32(f32::from_le_bytes(b));
                    consumed = 4;
                }
                ColumnType::Float64 => {
                    let b = take8(rest, "FLOAT64 value column")?;
                    tuple[logical] = Value::Float64(f64::from_le_bytes(b));
                    consumed = 8;
                }
                ColumnType::String => {
                    let (len, len_bytes) = varint::decode_u64(rest)?;
                    let len = usize::try_from(len)
                        .map_err(|_| Error::Decode("string length exceeds usize".to_string()))?;
                    let end = len_bytes
                        .checked_add(len)
                        .ok_or_else(|| Error::Decode("string length exceeds usize".to_string()))?;
                    let raw = rest
                        .get(len_bytes..end)
                        .ok_or_else(|| Error::Decode("truncated string payload".to_string()))?;
                    tuple[logical] = Value::String(raw.to_vec());
                    consumed = len_bytes + len;
                }
            }
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            return Err(Error::Decode(format!(
                "value has {} trailing bytes",
                rest.len()
            )));
        }
        Ok(())
    }
}
