//! Plan lifecycle and the budgeted execution loop.

use std::collections::VecDeque;

use rowkv_codec::{RecordDecoder, RecordEncoder};
use rowkv_expr::eval_expr;
use rowkv_plan::{CoprocessorPlan, ExecMode, PreparedPlan, prepare};
use rowkv_result::{Error, Result};
use rowkv_storage::{KeyValue, RawIterator};
use rowkv_types::Tuple;

use crate::aggregator::{Aggregator, GroupedAggregator};
use crate::selector::Selector;

/// What to do with a row that fails to decode mid-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorPolicy {
    /// Fail the call. The default.
    FailFast,
    /// Log a warning and skip the row.
    SkipWithWarn,
}

/// Construction-time knobs of one coprocessor instance.
#[derive(Debug, Clone)]
pub struct CoprocessorConfig {
    /// Ceiling on distinct groups buffered by one scan; exceeding it fails
    /// the call with [`Error::ResourceExhausted`].
    pub max_buffered_groups: usize,
    pub decode_errors: DecodeErrorPolicy,
}

impl Default for CoprocessorConfig {
    fn default() -> Self {
        Self {
            max_buffered_groups: 1 << 20,
            decode_errors: DecodeErrorPolicy::FailFast,
        }
    }
}

/// Per-call execution budget.
#[derive(Debug, Clone, Copy)]
pub struct ExecuteOptions {
    /// Skip value decoding when the plan touches only key columns.
    pub key_only: bool,
    /// Maximum output rows per call; `0` means unlimited.
    pub max_fetch_cnt: usize,
    /// Soft cap on summed `key + value` output bytes; `0` means unlimited.
    pub max_bytes_rpc: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            key_only: false,
            max_fetch_cnt: 0,
            max_bytes_rpc: 0,
        }
    }
}

/// One `execute` call's output.
#[derive(Debug)]
pub struct ExecuteBatch {
    pub kvs: Vec<KeyValue>,
    /// True iff output remains and the caller's budget was the reason for
    /// yielding.
    pub has_more: bool,
}

struct OpenState {
    plan: PreparedPlan,
    selector: Selector,
    aggregator: Aggregator,
    uses_non_key: bool,
    /// Grouped modes: the input scan has been consumed and flushed.
    scan_done: bool,
    /// Encoded grouped output awaiting budgeted drain.
    pending: VecDeque<KeyValue>,
}

/// A reusable coprocessor instance.
///
/// `open` validates and compiles a plan, `execute` drives one scan under a
/// per-call budget, `close` releases the schemas and any buffered groups.
/// Re-opening (with or without an intervening `close`) reconfigures the
/// instance.
#[derive(Default)]
pub struct Coprocessor {
    config: CoprocessorConfig,
    state: Option<OpenState>,
}

impl Coprocessor {
    pub fn new(config: CoprocessorConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Validate `plan` and configure this instance to run it.
    pub fn open(&mut self, plan: &CoprocessorPlan) -> Result<()> {
        let prepared = prepare(plan)?;
        let selector = Selector::new(prepared.selection.clone());
        let aggregator = match prepared.mode {
            ExecMode::Raw | ExecMode::PassThrough => Aggregator::PassThrough,
            ExecMode::GroupOnly | ExecMode::AggregateOnly | ExecMode::GroupAggregate => {
                let group_types = prepared
                    .group_by
                    .iter()
                    .map(|&i| prepared.projected_types[i])
                    .collect();
                Aggregator::Grouped(GroupedAggregator::new(
                    prepared.group_by.clone(),
                    group_types,
                    prepared.aggregations.clone(),
                    self.config.max_buffered_groups,
                ))
            }
        };
        let uses_non_key = prepared.uses_non_key_columns();
        tracing::debug!(mode = ?prepared.mode, "coprocessor opened");
        self.state = Some(OpenState {
            plan: prepared,
            selector,
            aggregator,
            uses_non_key,
            scan_done: false,
            pending: VecDeque::new(),
        });
        Ok(())
    }

    /// Release the open plan and any buffered output.
    pub fn close(&mut self) {
        self.state = None;
    }

    /// Run the open plan against `iter` under the given budget.
    ///
    /// The iterator must already be positioned (`seek`) with its upper
    /// bound set. Pass-through plans stream; grouped plans consume the
    /// iterator to exhaustion on the first call and drain buffered rows
    /// across subsequent calls. A call with a non-empty budget either
    /// yields at least one row or reports `has_more = false`.
    pub fn execute(
        &mut self,
        iter: &mut dyn RawIterator,
        opts: &ExecuteOptions,
    ) -> Result<ExecuteBatch> {
        let decode_errors = self.config.decode_errors;
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::Internal("execute on a coprocessor with no open plan".into()))?;

        let budget = Budget::new(opts);
        match state.plan.mode {
            ExecMode::Raw => execute_raw(iter, budget),
            ExecMode::PassThrough => execute_pass_through(state, iter, budget, opts, decode_errors),
            _ => execute_grouped(state, iter, budget, opts, decode_errors),
        }
    }
}

struct Budget {
    fetch_limit: usize,
    byte_limit: usize,
    rows: usize,
    bytes: usize,
}

impl Budget {
    fn new(opts: &ExecuteOptions) -> Self {
        Self {
            fetch_limit: if opts.max_fetch_cnt == 0 {
                usize::MAX
            } else {
                opts.max_fetch_cnt
            },
            byte_limit: if opts.max_bytes_rpc == 0 {
                usize::MAX
            } else {
                opts.max_bytes_rpc
            },
            rows: 0,
            bytes: 0,
        }
    }

    /// Whether another row may be emitted.
    fn has_room(&self) -> bool {
        self.rows < self.fetch_limit && self.bytes < self.byte_limit
    }

    fn charge(&mut self, kv: &KeyValue) {
        self.rows += 1;
        self.bytes += kv.encoded_len();
    }
}

fn execute_raw(iter: &mut dyn RawIterator, mut budget: Budget) -> Result<ExecuteBatch> {
    let mut kvs = Vec::new();
    while iter.valid() {
        if !budget.has_room() {
            return Ok(ExecuteBatch {
                kvs,
                has_more: true,
            });
        }
        let kv = KeyValue::new(iter.key().to_vec(), iter.value().to_vec());
        budget.charge(&kv);
        kvs.push(kv);
        iter.next();
    }
    Ok(ExecuteBatch {
        kvs,
        has_more: false,
    })
}

fn execute_pass_through(
    state: &mut OpenState,
    iter: &mut dyn RawIterator,
    mut budget: Budget,
    opts: &ExecuteOptions,
    decode_errors: DecodeErrorPolicy,
) -> Result<ExecuteBatch> {
    let encoder = RecordEncoder::new(&state.plan.result);
    let mut kvs = Vec::new();
    while iter.valid() {
        if !budget.has_room() {
            return Ok(ExecuteBatch {
                kvs,
                has_more: true,
            });
        }
        if let Some(projected) = next_projected(state, iter, opts, decode_errors)? {
            let (key, value) = encoder.encode(&projected)?;
            let kv = KeyValue::new(key, value);
            budget.charge(&kv);
            kvs.push(kv);
        }
        iter.next();
    }
    Ok(ExecuteBatch {
        kvs,
        has_more: false,
    })
}

fn execute_grouped(
    state: &mut OpenState,
    iter: &mut dyn RawIterator,
    mut budget: Budget,
    opts: &ExecuteOptions,
    decode_errors: DecodeErrorPolicy,
) -> Result<ExecuteBatch> {
    if !state.scan_done {
        while iter.valid() {
            if let Some(projected) = next_projected(state, iter, opts, decode_errors)? {
                let Aggregator::Grouped(grouped) = &mut state.aggregator else {
                    return Err(Error::Internal(
                        "grouped mode without a grouped aggregator".into(),
                    ));
                };
                grouped.feed(projected)?;
            }
            iter.next();
        }
        let Aggregator::Grouped(grouped) = &mut state.aggregator else {
            return Err(Error::Internal(
                "grouped mode without a grouped aggregator".into(),
            ));
        };
        let encoder = RecordEncoder::new(&state.plan.result);
        for row in grouped.flush()? {
            let (key, value) = encoder.encode(&row)?;
            state.pending.push_back(KeyValue::new(key, value));
        }
        state.scan_done = true;
    }

    let mut kvs = Vec::new();
    while budget.has_room() {
        match state.pending.pop_front() {
            Some(kv) => {
                budget.charge(&kv);
                kvs.push(kv);
            }
            None => {
                return Ok(ExecuteBatch {
                    kvs,
                    has_more: false,
                });
            }
        }
    }
    Ok(ExecuteBatch {
        kvs,
        has_more: !state.pending.is_empty(),
    })
}

/// Decode the row under the cursor, apply selection and filter.
///
/// Returns `Ok(None)` when the row is filtered out, or skipped under the
/// lenient decode policy.
fn next_projected(
    state: &OpenState,
    iter: &dyn RawIterator,
    opts: &ExecuteOptions,
    decode_errors: DecodeErrorPolicy,
) -> Result<Option<Tuple>> {
    let decoder = RecordDecoder::new(&state.plan.original);
    let decoded = if opts.key_only && !state.uses_non_key {
        decoder.decode_key_only(iter.key())
    } else {
        decoder.decode(iter.key(), iter.value())
    };
    let tuple = match decoded {
        Ok(tuple) => tuple,
        Err(err @ Error::Decode(_)) => match decode_errors {
            DecodeErrorPolicy::FailFast => return Err(err),
            DecodeErrorPolicy::SkipWithWarn => {
                tracing::warn!(error = %err, "skipping corrupt row");
                return Ok(None);
            }
        },
        Err(err) => return Err(err),
    };
    let projected = state.selector.project(tuple);
    if let Some(filter) = &state.plan.filter {
        if !eval_expr(filter, &projected)? {
            return Ok(None);
        }
    }
    Ok(Some(projected))
}
