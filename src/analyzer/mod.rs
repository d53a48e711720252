//! This module contains the gas hotspot analyzer, which fuses the decoded
//! instruction stream, its source mappings and the static gas schedule into
//! a ranked list of source-located hotspots.
//!
//! # Static Estimates and Trace Refinement
//!
//! With no further input the analyzer attributes each instruction its flat
//! cost from the static schedule in [`crate::opcode`]. When a runtime trace
//! is supplied, the gas actually consumed at each program counter (summed
//! over every visit, so loop bodies weigh their true cost) replaces the
//! static figure for that instruction. Runtime data always takes precedence
//! over the static estimate for the same location.
//!
//! # Failure Policy
//!
//! Any defect in a sub-step — an unknown byte, a short source map, a broken
//! trace entry — degrades to "no hotspot for this instruction" and a counter
//! in [`Diagnostics`], never an aborted analysis.

pub mod hotspot;
pub mod pattern;

use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::{
    analyzer::{
        hotspot::{GasHotspot, Severity, SourceRange},
        pattern::{recommendation_for, Pattern},
    },
    contract::CompiledArtifact,
    disassembly::{disassemble_hex, InstructionStream},
    error::Result,
    opcode::Mnemonic,
    source_map::SourceMap,
    trace::ExecutionTrace,
};

/// Configuration for a [`GasAnalyzer`] session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Whether source ranges whose accumulated gas is zero should still be
    /// reported as (optimal) hotspots.
    pub include_zero_gas_ranges: bool,
}

/// Counters for every degraded path taken during one analysis run.
///
/// These exist so that a collaborator can warn the user about partial
/// results without the analysis ever having to fail or retry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Bytes that decoded to no assigned instruction.
    pub unknown_opcodes: usize,

    /// `PUSH` instructions whose data ran past the end of the bytecode.
    pub truncated_pushes: usize,

    /// Two-character hex groups that could not be parsed as a byte.
    pub invalid_hex_pairs: usize,

    /// Whether the hex input had odd length.
    pub dropped_trailing_nibble: bool,

    /// Source-map fields that fell back to their inherited value.
    pub malformed_map_fields: usize,

    /// Instructions with no usable source mapping, either because the map
    /// was shorter than the instruction stream or because the mapped range
    /// was degenerate.
    pub unmapped_instructions: usize,
}

impl Diagnostics {
    /// Checks whether the analysis ran without taking any degraded path.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// The outcome of one analysis run: a ranked hotspot list plus the counters
/// describing how much of the input had to be degraded to produce it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The hotspots, sorted by accumulated gas descending.
    pub hotspots: Vec<GasHotspot>,

    /// The degraded-path counters for the run.
    pub diagnostics: Diagnostics,
}

/// The gas attribution session for one compiled contract.
///
/// An analyzer is a pure pipeline over values it is constructed with: the
/// same `(bytecode, source map)` pair produces an identical report on every
/// run. Construct a fresh analyzer per contract rather than reusing one
/// across compilation runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GasAnalyzer {
    bytecode: String,
    source_map: String,
    config: Config,
}

impl GasAnalyzer {
    /// Constructs a new analyzer over the provided hex `bytecode` and
    /// compiler `source_map` encoding.
    #[must_use]
    pub fn new(bytecode: impl Into<String>, source_map: impl Into<String>, config: Config) -> Self {
        Self {
            bytecode: bytecode.into(),
            source_map: source_map.into(),
            config,
        }
    }

    /// Constructs a new analyzer over the deployed bytecode and source map
    /// of the provided compiled `artifact`.
    #[must_use]
    pub fn from_artifact(artifact: &CompiledArtifact, config: Config) -> Self {
        Self::new(artifact.bytecode(), artifact.source_map(), config)
    }

    /// Runs the analysis using static gas estimates only.
    ///
    /// Empty bytecode — an abstract contract or library — produces an empty
    /// report, not an error.
    ///
    /// # Errors
    ///
    /// If the bytecode is too large for its offsets to be representable.
    pub fn analyze(&self) -> Result<AnalysisReport> {
        self.run(None)
    }

    /// Runs the analysis, refining the static estimates with the actual
    /// per-program-counter costs recorded in `trace`.
    ///
    /// # Errors
    ///
    /// If the bytecode is too large for its offsets to be representable.
    pub fn analyze_with_trace(&self, trace: &ExecutionTrace) -> Result<AnalysisReport> {
        self.run(Some(trace))
    }

    fn run(&self, trace: Option<&ExecutionTrace>) -> Result<AnalysisReport> {
        let stream = disassemble_hex(&self.bytecode)?;

        let mut diagnostics = Diagnostics {
            unknown_opcodes: stream.unknown_opcode_count,
            truncated_pushes: stream.truncated_push_count,
            invalid_hex_pairs: stream.invalid_hex_pair_count,
            dropped_trailing_nibble: stream.dropped_trailing_nibble,
            malformed_map_fields: 0,
            unmapped_instructions: 0,
        };

        // An empty stream can still carry hex-level degradation counts.
        if stream.is_empty() {
            return Ok(AnalysisReport {
                hotspots: vec![],
                diagnostics,
            });
        }

        let map = SourceMap::parse(&self.source_map);
        diagnostics.malformed_map_fields = map.malformed_field_count;
        let traced_costs = trace.map(actual_costs_by_pc).unwrap_or_default();

        let groups = group_by_range(&stream, &map, &traced_costs, &mut diagnostics);

        // Rank by accumulated gas, with the range as a deterministic
        // tie-break so repeated runs produce identical lists.
        let hotspots = groups
            .into_iter()
            .filter(|(_, group)| self.config.include_zero_gas_ranges || group.gas_used > 0)
            .sorted_by_key(|(range, group)| (std::cmp::Reverse(group.gas_used), *range))
            .map(|(source_range, group)| {
                let pattern = Pattern::detect(&group.mnemonics);
                let recommendation = recommendation_for(pattern, &group.mnemonics);
                GasHotspot {
                    source_range,
                    gas_used: group.gas_used,
                    severity: Severity::from_gas(group.gas_used),
                    opcodes_involved: group.mnemonics,
                    pattern,
                    recommendation,
                    suggested_fix: pattern.suggested_fix().map(str::to_string),
                }
            })
            .collect();

        Ok(AnalysisReport {
            hotspots,
            diagnostics,
        })
    }
}

/// The accumulator for all instructions mapped to one source range.
#[derive(Clone, Debug, Default)]
struct RangeGroup {
    gas_used: u64,
    mnemonics: Vec<Mnemonic>,
}

/// Accumulates gas and mnemonics into one group per exact source range.
fn group_by_range(
    stream: &InstructionStream,
    map: &SourceMap,
    traced_costs: &HashMap<u64, u64>,
    diagnostics: &mut Diagnostics,
) -> HashMap<SourceRange, RangeGroup> {
    let mut groups: HashMap<SourceRange, RangeGroup> = HashMap::new();

    for (index, instruction) in stream.instructions().iter().enumerate() {
        let Some(mapping) = map.entry(index) else {
            // The map is shorter than the instruction stream; positions
            // beyond it simply produce no hotspot.
            diagnostics.unmapped_instructions += 1;
            continue;
        };

        // Degenerate ranges carry no attributable source location.
        if mapping.source_start < 0 || mapping.length <= 0 {
            diagnostics.unmapped_instructions += 1;
            continue;
        }
        #[allow(clippy::cast_sign_loss)] // Negative values are rejected above
        let range = SourceRange::new(mapping.source_start as u64, mapping.length as u64);

        let gas = traced_costs
            .get(&u64::from(instruction.offset))
            .copied()
            .unwrap_or_else(|| instruction.mnemonic.gas_cost().estimate());

        let group = groups.entry(range).or_default();
        group.gas_used = group.gas_used.saturating_add(gas);
        group.mnemonics.push(instruction.mnemonic);
    }

    debug!(
        ranges = groups.len(),
        unmapped = diagnostics.unmapped_instructions,
        "grouped instructions by source range"
    );
    groups
}

/// Derives the gas actually consumed at each program counter from the
/// remaining-gas figures of consecutive trace entries.
///
/// Costs are summed over repeated visits to the same counter so that loop
/// bodies are attributed their full runtime weight; the sums saturate at
/// `u64::MAX` as the gas figures come from an untrusted trace. Only entries
/// at the trace's root call depth are considered: counters in deeper frames
/// index *other* contracts' bytecode and frequently collide with this
/// contract's counters.
fn actual_costs_by_pc(trace: &ExecutionTrace) -> HashMap<u64, u64> {
    let mut costs: HashMap<u64, u64> = HashMap::new();
    let Some(root_depth) = trace.struct_logs.first().map(|entry| entry.depth) else {
        return costs;
    };

    for (current, next) in trace.struct_logs.iter().tuple_windows() {
        if current.depth != root_depth {
            continue;
        }
        // A depth change means the gas difference includes the callee's
        // whole execution, which must not be attributed to this counter.
        if next.depth != current.depth {
            continue;
        }
        let cost = current.gas.saturating_sub(next.gas);
        let total = costs.entry(current.pc).or_insert(0);
        *total = total.saturating_add(cost);
    }

    costs
}
