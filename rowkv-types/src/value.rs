use std::cmp::Ordering;

/// Semantic type of a column.
///
/// A cheap, copyable tag; it labels the storage format of a column without
/// carrying any data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Arbitrary byte strings. The key encoding is order-preserving over raw
    /// bytes, so cells carry `Vec<u8>` rather than UTF-8 text.
    String,
}

impl ColumnType {
    /// Whether values of this type can feed `SUM`/`SUM0`.
    #[inline]
    pub fn is_summable(self) -> bool {
        !matches!(self, ColumnType::String)
    }
}

/// A single tuple cell: null or a typed value.
///
/// Encoders and decoders dispatch on the column's *declared* type; the cell's
/// dynamic tag must only match it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(Vec<u8>),
}

/// A fixed-length record of cells, one per logical column of the owning
/// schema.
pub type Tuple = Vec<Value>;

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Dynamic type tag of this cell, `None` for null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnType::Bool),
            Value::Int32(_) => Some(ColumnType::Int32),
            Value::Int64(_) => Some(ColumnType::Int64),
            Value::Float32(_) => Some(ColumnType::Float32),
            Value::Float64(_) => Some(ColumnType::Float64),
            Value::String(_) => Some(ColumnType::String),
        }
    }

    /// Whether this cell may legally occupy a column of type `ty`.
    ///
    /// Null matches every type; a typed cell matches only its own tag.
    #[inline]
    pub fn matches(&self, ty: ColumnType) -> bool {
        match self.column_type() {
            None => true,
            Some(tag) => tag == ty,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::String(v)
    }
}

/// Compare two cells of the same dynamic type.
///
/// Returns `None` when either side is null or the tags disagree. Floats
/// compare by IEEE-754 total order, so NaN sorts above positive infinity.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Int32(x), Value::Int32(y)) => Some(x.cmp(y)),
        (Value::Int64(x), Value::Int64(y)) => Some(x.cmp(y)),
        (Value::Float32(x), Value::Float32(y)) => Some(x.total_cmp(y)),
        (Value::Float64(x), Value::Float64(y)) => Some(x.total_cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_matches_every_type() {
        for ty in [
            ColumnType::Bool,
            ColumnType::Int32,
            ColumnType::Int64,
            ColumnType::Float32,
            ColumnType::Float64,
            ColumnType::String,
        ] {
            assert!(Value::Null.matches(ty));
        }
    }

    #[test]
    fn typed_cell_matches_only_its_tag() {
        assert!(Value::Int32(7).matches(ColumnType::Int32));
        assert!(!Value::Int32(7).matches(ColumnType::Int64));
        assert!(Value::from("abc").matches(ColumnType::String));
    }

    #[test]
    fn compare_is_none_across_types_and_nulls() {
        assert_eq!(compare_values(&Value::Null, &Value::Int32(1)), None);
        assert_eq!(compare_values(&Value::Int32(1), &Value::Int64(1)), None);
    }

    #[test]
    fn float_comparison_is_total() {
        assert_eq!(
            compare_values(&Value::Float64(-0.0), &Value::Float64(0.0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(&Value::Float64(1.0), &Value::Float64(f64::NAN)),
            Some(Ordering::Less)
        );
    }
}
