//! Column projection over decoded tuples.

use rowkv_types::Tuple;

/// Projects decoded tuples by logical column index.
///
/// The selection list may repeat columns and its order is meaningful. An
/// empty list is the identity: the full row passes through. Indices are
/// validated at plan open, so projection itself cannot fail.
pub struct Selector {
    selection: Vec<usize>,
}

impl Selector {
    pub fn new(selection: Vec<usize>) -> Self {
        Self { selection }
    }

    /// Shape `tuple` per the selection list.
    pub fn project(&self, tuple: Tuple) -> Tuple {
        if self.selection.is_empty() {
            return tuple;
        }
        self.selection.iter().map(|&i| tuple[i].clone()).collect()
    }
}
