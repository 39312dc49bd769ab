//! Ordered key/value surface the coprocessor consumes.
//!
//! The coprocessor only needs a forward cursor with an exclusive upper
//! bound; [`RawIterator`] is that contract. [`MemEngine`] is an ordered
//! in-memory store used by tests and demos, standing in for an LSM engine.

#![forbid(unsafe_code)]

pub mod iter;
pub mod mem;

pub use iter::{IterOptions, KeyValue, RawIterator};
pub use mem::{MemEngine, MemIter};

/// The smallest key strictly greater than every key with prefix `key`.
///
/// Increments the rightmost byte that is not `0xFF` and truncates behind
/// it. `None` means no such key exists (the prefix is empty or all `0xFF`),
/// i.e. the range is unbounded above.
pub fn prefix_next(key: &[u8]) -> Option<Vec<u8>> {
    let mut out = key.to_vec();
    while let Some(last) = out.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return Some(out);
        }
        out.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_next_increments_last_byte() {
        assert_eq!(prefix_next(b"abc"), Some(b"abd".to_vec()));
        assert_eq!(prefix_next(&[0x00]), Some(vec![0x01]));
    }

    #[test]
    fn prefix_next_carries_over_ff() {
        assert_eq!(prefix_next(&[0x61, 0xFF]), Some(vec![0x62]));
        assert_eq!(prefix_next(&[0x61, 0xFF, 0xFF]), Some(vec![0x62]));
    }

    #[test]
    fn prefix_next_unbounded_cases() {
        assert_eq!(prefix_next(&[]), None);
        assert_eq!(prefix_next(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn prefix_next_bounds_the_prefix_range() {
        let next = prefix_next(b"ab").unwrap();
        assert!(b"ab".as_slice() < next.as_slice());
        assert!(b"ab\xff\xff\xff".as_slice() < next.as_slice());
        assert!(b"ac".as_slice() >= next.as_slice());
    }
}
