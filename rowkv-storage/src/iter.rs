//! Forward-iterator contract over an ordered key/value snapshot.

/// One encoded row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self { key, value }
    }

    /// Bytes this row contributes toward an RPC budget.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

/// Options fixed at iterator construction.
#[derive(Debug, Clone, Default)]
pub struct IterOptions {
    /// Exclusive upper bound; `None` scans to the end of the keyspace.
    pub upper_bound: Option<Vec<u8>>,
}

impl IterOptions {
    pub fn with_upper_bound(upper_bound: impl Into<Vec<u8>>) -> Self {
        Self {
            upper_bound: Some(upper_bound.into()),
        }
    }
}

/// Forward cursor over memcmp-ordered keys.
///
/// The cursor is positioned with [`seek`](RawIterator::seek) and walked
/// with [`next`](RawIterator::next); `key`/`value` may only be called while
/// [`valid`](RawIterator::valid) returns true. The iterator reflects the
/// snapshot it was created from and blocks only on the engine's synchronous
/// read path.
pub trait RawIterator {
    /// Position at the first entry with key ≥ `key` (and below the upper
    /// bound, if any).
    fn seek(&mut self, key: &[u8]);

    fn valid(&self) -> bool;

    /// Current key. Only meaningful while `valid()`.
    fn key(&self) -> &[u8];

    /// Current value. Only meaningful while `valid()`.
    fn value(&self) -> &[u8];

    fn next(&mut self);
}
