//! This module contains the storage-state reconstructor, which derives
//! typed, ordered snapshots of a contract's storage from raw execution
//! traces and the compiler's storage layout.
//!
//! # Several Feeds, One Model
//!
//! Snapshots enter the history from independent feeds: the trace feed scans
//! a transaction's `structLogs` for `SSTORE`s, the initial feed synthesises
//! the post-deployment zero state from the storage layout, and the set feed
//! applies a single hand-made write. All of them append to the same strictly
//! ordered history, and the "current state" at any snapshot is always
//! recomputed by folding the changes up to it, never cached destructively.

pub mod layout;
pub mod snapshot;

use std::{
    collections::{BTreeMap, HashMap},
    time::{SystemTime, UNIX_EPOCH},
};

use serde_json::Value;
use tracing::debug;

use crate::{
    abi::FunctionAbi,
    constant::ZERO_WORD,
    state::{
        layout::StorageLayout,
        snapshot::{
            display_value,
            infer_type,
            ChangeOperation,
            StateChange,
            StateSnapshot,
            VariableState,
        },
    },
    trace::ExecutionTrace,
    utility::{canonical_word, words_equal},
};

/// The storage-state reconstruction session for one contract.
///
/// A reconstructor is scoped to one analysis session; repeated or
/// concurrent analyses should each construct their own rather than share
/// one, so that no state leaks between sessions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateReconstructor {
    layout: Option<StorageLayout>,
    snapshots: Vec<StateSnapshot>,
    next_id: u64,

    /// Trace entries that were dropped because their shape was unusable.
    pub skipped_trace_entries: usize,

    /// Writes whose slot the storage layout could not name, forcing type
    /// inference from the raw value.
    pub unattributed_slots: usize,
}

impl StateReconstructor {
    /// Constructs a new reconstructor, attributing slots against the
    /// provided storage `layout` where one is available.
    #[must_use]
    pub fn new(layout: Option<StorageLayout>) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Synthesises the post-deployment snapshot: one change per layout
    /// variable, each holding its type-appropriate zero value.
    ///
    /// Returns [`None`] when no storage layout is available, as there is
    /// nothing to synthesise from.
    pub fn record_initial(&mut self) -> Option<&StateSnapshot> {
        let layout = self.layout.as_ref()?;

        let changes = layout
            .variables()
            .iter()
            .map(|variable| StateChange {
                slot: canonical_word(&format!("{:#x}", variable.slot)),
                old_value: variable.zero_value().to_string(),
                new_value: variable.zero_value().to_string(),
                variable_name: Some(variable.label.clone()),
                type_info: Some(variable.solidity_type.clone()),
                operation: ChangeOperation::Initial,
                program_counter: 0,
                call_depth: 0,
                transaction_hash: None,
            })
            .collect();

        Some(self.append(changes, None, Value::String("deployment".to_string())))
    }

    /// Scans the ordered entries of `trace` for storage writes and appends
    /// one snapshot holding the resulting changes.
    ///
    /// Only `SSTORE` entries are interpreted: the second-to-top stack entry
    /// is the written slot and the top entry the new value. Entries with
    /// too short a stack are skipped and counted. Writing a value a slot
    /// already holds within the same trace produces no change record.
    pub fn record_trace(
        &mut self,
        trace: &ExecutionTrace,
        transaction_hash: Option<String>,
        context_info: Value,
    ) -> &StateSnapshot {
        self.skipped_trace_entries += trace.malformed_entry_count;

        // Last value written per slot within this trace, for no-op
        // suppression and old-value tracking.
        let mut last_values: HashMap<String, String> = HashMap::new();
        let mut changes = Vec::new();

        for entry in &trace.struct_logs {
            if entry.op != "SSTORE" {
                continue;
            }
            let stack_len = entry.stack.len();
            if stack_len < 2 {
                self.skipped_trace_entries += 1;
                debug!(pc = entry.pc, "SSTORE entry with a short stack; skipping");
                continue;
            }

            let slot = canonical_word(&entry.stack[stack_len - 2]);
            let new_value = canonical_word(&entry.stack[stack_len - 1]);
            let old_value = last_values
                .get(&slot)
                .cloned()
                .unwrap_or_else(|| ZERO_WORD.to_string());

            if words_equal(&old_value, &new_value) {
                // A no-op write; the state did not change.
                continue;
            }
            last_values.insert(slot.clone(), new_value.clone());

            let (variable_name, type_info) = self.attribute(&slot, &new_value);
            changes.push(StateChange {
                slot,
                old_value,
                new_value,
                variable_name,
                type_info,
                operation: ChangeOperation::SStore,
                program_counter: entry.pc,
                call_depth: entry.depth,
                transaction_hash: transaction_hash.clone(),
            });
        }

        self.append(changes, transaction_hash, context_info)
    }

    /// Records a direct write of `value` to `slot`, applied outside any
    /// trace, as its own snapshot.
    ///
    /// This is the feed used when the collaborator sets a variable by hand
    /// rather than observing a transaction.
    pub fn record_set(
        &mut self,
        slot: &str,
        old_value: &str,
        new_value: &str,
        context_info: Value,
    ) -> &StateSnapshot {
        let slot = canonical_word(slot);
        let new_value = canonical_word(new_value);
        let (variable_name, type_info) = self.attribute(&slot, &new_value);

        let changes = vec![StateChange {
            slot,
            old_value: canonical_word(old_value),
            new_value,
            variable_name,
            type_info,
            operation: ChangeOperation::Set,
            program_counter: 0,
            call_depth: 0,
            transaction_hash: None,
        }];
        self.append(changes, None, context_info)
    }

    /// Records the effect of a simulated call to `function`.
    ///
    /// View and pure functions cannot touch storage, so simulating them
    /// appends nothing and returns [`None`]; state-mutating functions feed
    /// their trace through [`Self::record_trace`].
    pub fn record_call(
        &mut self,
        function: &FunctionAbi,
        trace: &ExecutionTrace,
        transaction_hash: Option<String>,
    ) -> Option<&StateSnapshot> {
        if function.is_read_only() {
            debug!(
                function = function.name.as_deref().unwrap_or("<unnamed>"),
                "simulated call is view/pure; no state effect"
            );
            return None;
        }

        let context = Value::String(format!(
            "call: {}",
            function.name.as_deref().unwrap_or("<unnamed>")
        ));
        Some(self.record_trace(trace, transaction_hash, context))
    }

    /// Gets the snapshot history in append order.
    #[must_use]
    pub fn snapshots(&self) -> &[StateSnapshot] {
        &self.snapshots
    }

    /// Gets the most recently appended snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&StateSnapshot> {
        self.snapshots.last()
    }

    /// Projects the current state as of the snapshot with the provided
    /// `snapshot_id`, folding every change up to and including it with
    /// last-write-wins semantics.
    ///
    /// The projection is keyed by variable name where attribution
    /// succeeded, and by raw slot otherwise.
    #[must_use]
    pub fn current_state(&self, snapshot_id: u64) -> BTreeMap<String, VariableState> {
        let mut state = BTreeMap::new();

        for snap in self.snapshots.iter().filter(|snap| snap.id <= snapshot_id) {
            for change in &snap.changes {
                let key = change
                    .variable_name
                    .clone()
                    .unwrap_or_else(|| change.slot.clone());
                state.insert(
                    key,
                    VariableState {
                        type_info: change.type_info.clone(),
                        value: change.new_value.clone(),
                        display_value: display_value(
                            change.type_info.as_deref(),
                            &change.new_value,
                        ),
                        previous_value: Some(change.old_value.clone()),
                        slot: change.slot.clone(),
                        operation: change.operation,
                    },
                );
            }
        }

        state
    }

    /// Projects the current state as of the latest snapshot.
    #[must_use]
    pub fn latest_state(&self) -> BTreeMap<String, VariableState> {
        self.latest()
            .map(|snap| self.current_state(snap.id))
            .unwrap_or_default()
    }

    /// Resolves the written `slot` to a variable name and type, falling
    /// back to inference from the `value`'s shape when the layout does not
    /// name the slot.
    fn attribute(&mut self, slot: &str, value: &str) -> (Option<String>, Option<String>) {
        if let Some(variable) = self
            .layout
            .as_ref()
            .and_then(|layout| layout.variable_for_slot(slot))
        {
            return (
                Some(variable.label.clone()),
                Some(variable.solidity_type.clone()),
            );
        }

        self.unattributed_slots += 1;
        (None, Some(infer_type(value)))
    }

    fn append(
        &mut self,
        changes: Vec<StateChange>,
        transaction_hash: Option<String>,
        context_info: Value,
    ) -> &StateSnapshot {
        let snapshot = StateSnapshot {
            id: self.next_id,
            timestamp: unix_millis(),
            changes,
            transaction_hash,
            context_info,
        };
        self.next_id += 1;
        self.snapshots.push(snapshot);

        // Just pushed, so the history cannot be empty.
        self.snapshots.last().unwrap_or_else(|| unreachable!())
    }
}

/// Gets the current wall-clock time in milliseconds since the Unix epoch,
/// treating a clock before the epoch as the epoch itself.
fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use ethnum::U256;
    use serde_json::Value;

    use super::StateReconstructor;
    use crate::{
        state::layout::{StorageLayout, StorageVariable},
        trace::{ExecutionTrace, StructLog},
    };

    fn sstore(pc: u64, slot: &str, value: &str) -> StructLog {
        StructLog {
            pc,
            op: "SSTORE".to_string(),
            stack: vec![slot.to_string(), value.to_string()],
            depth: 1,
            gas: 0,
        }
    }

    fn trace_of(logs: Vec<StructLog>) -> ExecutionTrace {
        ExecutionTrace {
            result: None,
            struct_logs: logs,
            malformed_entry_count: 0,
        }
    }

    fn counter_layout() -> StorageLayout {
        StorageLayout::new(vec![StorageVariable {
            slot: U256::ZERO,
            label: "count".to_string(),
            solidity_type: "t_uint256".to_string(),
            offset: 0,
        }])
    }

    #[test]
    fn attributes_writes_against_the_layout() {
        let mut reconstructor = StateReconstructor::new(Some(counter_layout()));
        let trace = trace_of(vec![sstore(7, "0x0", "0x2a")]);

        let snapshot = reconstructor.record_trace(&trace, None, Value::Null);
        assert_eq!(snapshot.changes.len(), 1);
        let change = &snapshot.changes[0];
        assert_eq!(change.variable_name.as_deref(), Some("count"));
        assert_eq!(change.type_info.as_deref(), Some("t_uint256"));
        assert_eq!(change.program_counter, 7);
        assert_eq!(reconstructor.unattributed_slots, 0);
    }

    #[test]
    fn falls_back_to_type_inference_without_a_layout() {
        let mut reconstructor = StateReconstructor::new(None);
        let trace = trace_of(vec![sstore(0, "0x5", "0x1")]);

        let snapshot = reconstructor.record_trace(&trace, None, Value::Null);
        let change = &snapshot.changes[0];
        assert_eq!(change.variable_name, None);
        assert_eq!(change.type_info.as_deref(), Some("bool | uint256"));
        assert_eq!(reconstructor.unattributed_slots, 1);
    }

    #[test]
    fn suppresses_no_op_writes() {
        let mut reconstructor = StateReconstructor::new(None);
        let trace = trace_of(vec![
            sstore(0, "0x1", "0x2a"),
            // Same value, differently padded.
            sstore(5, "0x1", "0x002a"),
            // Writing the assumed zero to an untouched slot is also a no-op.
            sstore(9, "0x2", "0x0"),
        ]);

        let snapshot = reconstructor.record_trace(&trace, None, Value::Null);
        assert_eq!(snapshot.changes.len(), 1);
        assert_eq!(snapshot.changes[0].program_counter, 0);
    }

    #[test]
    fn skips_entries_with_short_stacks() {
        let mut reconstructor = StateReconstructor::new(None);
        let broken = StructLog {
            pc: 3,
            op: "SSTORE".to_string(),
            stack: vec!["0x1".to_string()],
            depth: 1,
            gas: 0,
        };
        let trace = trace_of(vec![broken, sstore(8, "0x0", "0x1")]);

        let snapshot = reconstructor.record_trace(&trace, None, Value::Null);
        assert_eq!(snapshot.changes.len(), 1);
        assert_eq!(reconstructor.skipped_trace_entries, 1);
    }

    #[test]
    fn folds_history_up_to_the_chosen_snapshot() {
        let mut reconstructor = StateReconstructor::new(Some(counter_layout()));
        reconstructor.record_initial();

        for value in ["0x1", "0x2", "0x3"] {
            let trace = trace_of(vec![sstore(0, "0x0", value)]);
            reconstructor.record_trace(&trace, None, Value::Null);
        }

        // State at snapshot 2 reflects the writes from snapshots 0..=2 and
        // nothing later.
        let state = reconstructor.current_state(2);
        assert_eq!(state["count"].value, "0x2");
        assert_eq!(state["count"].display_value, "2");

        let latest = reconstructor.latest_state();
        assert_eq!(latest["count"].value, "0x3");

        // The initial snapshot alone shows the zero state.
        let initial = reconstructor.current_state(0);
        assert_eq!(initial["count"].value, "0x0");
    }

    #[test]
    fn direct_sets_enter_the_same_history() {
        let mut reconstructor = StateReconstructor::new(Some(counter_layout()));
        reconstructor.record_initial();
        reconstructor.record_set("0x0", "0x0", "0x64", Value::Null);

        let state = reconstructor.latest_state();
        assert_eq!(state["count"].value, "0x64");
        assert_eq!(state["count"].display_value, "100");
        assert_eq!(
            state["count"].operation,
            crate::state::snapshot::ChangeOperation::Set
        );
    }

    #[test]
    fn snapshot_ids_increase_monotonically() {
        let mut reconstructor = StateReconstructor::new(None);
        for _ in 0..3 {
            let trace = trace_of(vec![]);
            reconstructor.record_trace(&trace, None, Value::Null);
        }

        let ids: Vec<u64> = reconstructor.snapshots().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
