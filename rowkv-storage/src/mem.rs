//! In-memory ordered engine used for tests and demos.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use crate::iter::{IterOptions, KeyValue, RawIterator};

/// Ordered in-memory key/value store.
///
/// Stands in for the LSM engine underneath a storage node: point put and
/// delete, range delete, and snapshot iterators with an exclusive upper
/// bound. Iterators copy the visible range at creation time, which gives
/// them snapshot semantics at test-harness scale.
pub struct MemEngine {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl Default for MemEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemEngine {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn put(&self, kv: KeyValue) {
        let mut map = self
            .entries
            .write()
            .expect("MemEngine entries write lock poisoned");
        map.insert(kv.key, kv.value);
    }

    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let map = self
            .entries
            .read()
            .expect("MemEngine entries read lock poisoned");
        map.get(key).cloned()
    }

    pub fn delete(&self, key: &[u8]) {
        let mut map = self
            .entries
            .write()
            .expect("MemEngine entries write lock poisoned");
        map.remove(key);
    }

    /// Remove every key in `[start, end)`.
    pub fn delete_range(&self, start: &[u8], end: &[u8]) {
        let mut map = self
            .entries
            .write()
            .expect("MemEngine entries write lock poisoned");
        let doomed: Vec<Vec<u8>> = map
            .range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(k, _)| k.clone())
            .collect();
        for k in doomed {
            map.remove(&k);
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("MemEngine entries read lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot iterator honoring the options' exclusive upper bound.
    ///
    /// The iterator starts unpositioned; call [`RawIterator::seek`] first.
    pub fn iter(&self, options: IterOptions) -> MemIter {
        let map = self
            .entries
            .read()
            .expect("MemEngine entries read lock poisoned");
        let entries: Vec<KeyValue> = match &options.upper_bound {
            Some(upper) => map
                .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(upper.as_slice())))
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect(),
            None => map
                .iter()
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect(),
        };
        MemIter {
            entries,
            pos: usize::MAX,
        }
    }
}

/// Snapshot cursor over a [`MemEngine`] range.
pub struct MemIter {
    entries: Vec<KeyValue>,
    pos: usize,
}

impl RawIterator for MemIter {
    fn seek(&mut self, key: &[u8]) {
        self.pos = self.entries.partition_point(|kv| kv.key.as_slice() < key);
    }

    fn valid(&self) -> bool {
        self.pos < self.entries.len()
    }

    fn key(&self) -> &[u8] {
        &self.entries[self.pos].key
    }

    fn value(&self) -> &[u8] {
        &self.entries[self.pos].value
    }

    fn next(&mut self) {
        if self.pos < self.entries.len() {
            self.pos += 1;
        }
    }
}
