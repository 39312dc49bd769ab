//! Grouped accumulation keyed by canonical group-key bytes.

use rowkv_aggregate::AccumulatorSet;
use rowkv_codec::encode_group_key;
use rowkv_plan::PreparedAggregation;
use rowkv_result::{Error, Result};
use rowkv_types::{ColumnType, Tuple, Value};
use rustc_hash::FxHashMap;

/// Grouped or pass-through accumulation over the projected stream.
pub enum Aggregator {
    /// Modes with neither grouping nor aggregation: every projected tuple
    /// is an output row and the aggregator holds no state.
    PassThrough,
    Grouped(GroupedAggregator),
}

impl Aggregator {
    pub fn pass_through(&self) -> bool {
        matches!(self, Aggregator::PassThrough)
    }
}

struct GroupEntry {
    /// The group-key cells, in `group_by` order.
    key: Tuple,
    accs: AccumulatorSet,
}

/// Maintains `group key → accumulator set` over one scan.
///
/// The map key is the canonical sort-key encoding of the group columns, so
/// tuples that are semantically equal (`-0.0` vs `+0.0`) land in one group
/// no matter their in-memory representation. Entries keep arrival order;
/// output order is unspecified for callers either way.
pub struct GroupedAggregator {
    group_by: Vec<usize>,
    group_types: Vec<ColumnType>,
    aggregations: Vec<PreparedAggregation>,
    /// Mode C: exactly one implicit group, emitted even for an empty scan.
    implicit_group: bool,
    max_groups: usize,
    index: FxHashMap<Vec<u8>, usize>,
    entries: Vec<GroupEntry>,
}

impl GroupedAggregator {
    pub fn new(
        group_by: Vec<usize>,
        group_types: Vec<ColumnType>,
        aggregations: Vec<PreparedAggregation>,
        max_groups: usize,
    ) -> Self {
        let implicit_group = group_by.is_empty();
        Self {
            group_by,
            group_types,
            aggregations,
            implicit_group,
            max_groups,
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    /// Fold one projected tuple into its group.
    pub fn feed(&mut self, projected: Tuple) -> Result<()> {
        let cells: Vec<&Value> = self.group_by.iter().map(|&i| &projected[i]).collect();
        let mut key_bytes = Vec::new();
        encode_group_key(&mut key_bytes, &cells, &self.group_types)?;

        let at = match self.index.get(&key_bytes) {
            Some(&at) => at,
            None => {
                if self.entries.len() >= self.max_groups {
                    return Err(Error::ResourceExhausted(format!(
                        "group map exceeds {} groups",
                        self.max_groups
                    )));
                }
                let key: Tuple = cells.into_iter().cloned().collect();
                let accs = AccumulatorSet::new(&self.aggregations)?;
                let at = self.entries.len();
                self.index.insert(key_bytes, at);
                self.entries.push(GroupEntry { key, accs });
                at
            }
        };
        self.entries[at].accs.update(&projected)
    }

    /// Emit one result tuple per group and reset the aggregator.
    ///
    /// Each row is `[group-key cells || aggregation results]`. An integer
    /// sum that overflowed reports which group it belongs to.
    pub fn flush(&mut self) -> Result<Vec<Tuple>> {
        if self.entries.is_empty() && self.implicit_group {
            self.entries.push(GroupEntry {
                key: Tuple::new(),
                accs: AccumulatorSet::new(&self.aggregations)?,
            });
        }
        let mut rows = Vec::with_capacity(self.entries.len());
        for (ordinal, entry) in self.entries.iter().enumerate() {
            let mut row = entry.key.clone();
            entry.accs.finalize_into(&mut row).map_err(|e| match e {
                Error::Overflow(msg) => Error::Overflow(format!("group {ordinal}: {msg}")),
                other => other,
            })?;
            rows.push(row);
        }
        self.index.clear();
        self.entries.clear();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkv_plan::AggregationType;

    fn count_slot(input: Option<usize>) -> PreparedAggregation {
        PreparedAggregation {
            oper: AggregationType::Count,
            input,
            input_type: input.map(|_| ColumnType::Int32),
            output_type: ColumnType::Int64,
        }
    }

    #[test]
    fn groups_split_on_key_and_null_forms_its_own_group() {
        let mut agg = GroupedAggregator::new(
            vec![0],
            vec![ColumnType::Bool],
            vec![count_slot(Some(1))],
            1 << 10,
        );
        agg.feed(vec![Value::Bool(true), Value::Int32(1)]).unwrap();
        agg.feed(vec![Value::Bool(false), Value::Int32(2)]).unwrap();
        agg.feed(vec![Value::Null, Value::Int32(3)]).unwrap();
        agg.feed(vec![Value::Bool(true), Value::Null]).unwrap();

        let mut rows = agg.flush().unwrap();
        rows.sort_by_key(|r| format!("{:?}", r[0]));
        assert_eq!(rows.len(), 3);
        // true group saw one non-null and one null input for COUNT.
        let true_row = rows
            .iter()
            .find(|r| r[0] == Value::Bool(true))
            .expect("true group present");
        assert_eq!(true_row[1], Value::Int64(1));
    }

    #[test]
    fn implicit_group_emits_even_for_empty_scan() {
        let mut agg =
            GroupedAggregator::new(vec![], vec![], vec![count_slot(Some(0))], 1 << 10);
        let rows = agg.flush().unwrap();
        assert_eq!(rows, vec![vec![Value::Int64(0)]]);
    }

    #[test]
    fn negative_and_positive_zero_share_a_group() {
        let mut agg = GroupedAggregator::new(
            vec![0],
            vec![ColumnType::Float64],
            vec![count_slot(Some(0))],
            1 << 10,
        );
        agg.feed(vec![Value::Float64(0.0)]).unwrap();
        agg.feed(vec![Value::Float64(-0.0)]).unwrap();
        let rows = agg.flush().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], Value::Int64(2));
    }

    #[test]
    fn group_ceiling_is_enforced() {
        let mut agg = GroupedAggregator::new(
            vec![0],
            vec![ColumnType::Int32],
            vec![count_slot(None)],
            2,
        );
        agg.feed(vec![Value::Int32(1)]).unwrap();
        agg.feed(vec![Value::Int32(2)]).unwrap();
        // Existing groups still accept rows.
        agg.feed(vec![Value::Int32(1)]).unwrap();
        assert!(matches!(
            agg.feed(vec![Value::Int32(3)]),
            Err(Error::ResourceExhausted(_))
        ));
    }
}
