use rowkv_result::{Error, Result};

use crate::value::{ColumnType, Value};
use crate::{CommonId, SchemaVersion};

/// One column of a schema.
///
/// `index` is the *physical* index: the position the column occupies in the
/// serialized tuple. The descriptor's position in the schema list is the
/// *logical* index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub column_type: ColumnType,
    pub is_key: bool,
    pub is_nullable: bool,
    pub index: usize,
}

impl ColumnDescriptor {
    pub fn new(column_type: ColumnType, is_key: bool, is_nullable: bool, index: usize) -> Self {
        Self {
            column_type,
            is_key,
            is_nullable,
            index,
        }
    }
}

/// An ordered list of column descriptors plus the table identity.
///
/// Construction validates that physical indices are unique and lie in
/// `[0, N)`. The encoded key part holds the `is_key` columns in ascending
/// physical-index order; the value part holds the rest, also in ascending
/// physical-index order. Both orders are precomputed here as lists of
/// logical indices so the codec never re-derives them per row.
///
/// Schemas are immutable from `open` to `close`.
#[derive(Debug, Clone)]
pub struct Schema {
    common_id: CommonId,
    version: SchemaVersion,
    columns: Vec<ColumnDescriptor>,
    key_logical: Vec<usize>,
    value_logical: Vec<usize>,
}

impl Schema {
    pub fn new(
        common_id: CommonId,
        version: SchemaVersion,
        columns: Vec<ColumnDescriptor>,
    ) -> Result<Self> {
        let n = columns.len();
        let mut seen = vec![false; n];
        for (logical, col) in columns.iter().enumerate() {
            if col.index >= n {
                return Err(Error::InvalidPlan(format!(
                    "column {logical} has physical index {} outside [0, {n})",
                    col.index
                )));
            }
            if seen[col.index] {
                return Err(Error::InvalidPlan(format!(
                    "duplicate physical index {} at column {logical}",
                    col.index
                )));
            }
            seen[col.index] = true;
        }

        let mut key_logical: Vec<usize> = (0..n).filter(|&i| columns[i].is_key).collect();
        key_logical.sort_by_key(|&i| columns[i].index);
        let mut value_logical: Vec<usize> = (0..n).filter(|&i| !columns[i].is_key).collect();
        value_logical.sort_by_key(|&i| columns[i].index);

        Ok(Self {
            common_id,
            version,
            columns,
            key_logical,
            value_logical,
        })
    }

    #[inline]
    pub fn common_id(&self) -> CommonId {
        self.common_id
    }

    #[inline]
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    #[inline]
    pub fn column(&self, logical: usize) -> &ColumnDescriptor {
        &self.columns[logical]
    }

    /// Logical indices of the key columns, ascending by physical index.
    #[inline]
    pub fn key_columns(&self) -> &[usize] {
        &self.key_logical
    }

    /// Logical indices of the non-key columns, ascending by physical index.
    #[inline]
    pub fn value_columns(&self) -> &[usize] {
        &self.value_logical
    }

    /// Check a tuple's shape against this schema.
    ///
    /// Verifies arity, per-cell tag agreement with the declared types, and
    /// that no non-nullable column holds a null.
    pub fn check_tuple(&self, tuple: &[Value]) -> Result<()> {
        if tuple.len() != self.columns.len() {
            return Err(Error::SchemaMismatch(format!(
                "tuple has {} values, schema has {} columns",
                tuple.len(),
                self.columns.len()
            )));
        }
        for (logical, (cell, col)) in tuple.iter().zip(&self.columns).enumerate() {
            if cell.is_null() {
                if !col.is_nullable {
                    return Err(Error::SchemaMismatch(format!(
                        "null in non-nullable column {logical}"
                    )));
                }
            } else if !cell.matches(col.column_type) {
                return Err(Error::TypeMismatch(format!(
                    "column {logical} declared {:?} but cell is {:?}",
                    col.column_type,
                    cell.column_type()
                )));
            }
        }
        Ok(())
    }
}
