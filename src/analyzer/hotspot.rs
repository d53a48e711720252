//! This module contains the types describing a single gas hotspot: an
//! aggregated, source-located region of the bytecode carrying an accumulated
//! gas cost, a severity classification and optimisation advice.

use serde::Serialize;

use crate::{
    analyzer::pattern::Pattern,
    constant::{
        SEVERITY_CRITICAL_THRESHOLD,
        SEVERITY_HIGH_THRESHOLD,
        SEVERITY_WARNING_THRESHOLD,
    },
    opcode::Mnemonic,
};

/// A half-open range of byte offsets into the source text.
///
/// The exact range is the grouping key for hotspots: every instruction whose
/// source mapping resolves to the same range accumulates into one hotspot.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SourceRange {
    /// The byte offset at which the range starts.
    pub start: u64,

    /// The byte offset one past the end of the range.
    pub end: u64,
}

impl SourceRange {
    /// Constructs the range covering `length` bytes from `start`.
    #[must_use]
    pub fn new(start: u64, length: u64) -> Self {
        Self {
            start,
            end: start + length,
        }
    }
}

/// The severity classification of a hotspot, a pure step function of its
/// accumulated gas.
///
/// The vocabulary is closed and versioned; collaborators receiving an
/// unrecognised value over the wire are expected to treat it as `other`
/// rather than failing.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Optimal,
    Warning,
    High,
    Critical,
}

impl Severity {
    /// Classifies the provided accumulated `gas` figure.
    ///
    /// The function is non-decreasing across the classification boundaries,
    /// so accumulating more gas can never *lower* a hotspot's severity.
    #[must_use]
    pub fn from_gas(gas: u64) -> Self {
        if gas < SEVERITY_WARNING_THRESHOLD {
            Self::Optimal
        } else if gas < SEVERITY_HIGH_THRESHOLD {
            Self::Warning
        } else if gas < SEVERITY_CRITICAL_THRESHOLD {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Gets the rank used to order a guided tour, with the most severe
    /// classification first.
    #[must_use]
    pub fn tour_rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Warning => 2,
            Self::Optimal => 3,
        }
    }
}

/// An aggregated, source-located gas hotspot.
///
/// Hotspots are never mutated once an analysis pass completes; each analysis
/// run produces a fresh ranked list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasHotspot {
    /// The exact source range the hotspot covers.
    pub source_range: SourceRange,

    /// The gas accumulated across every instruction mapped to the range.
    pub gas_used: u64,

    /// The severity classification of [`Self::gas_used`].
    pub severity: Severity,

    /// The mnemonics of the contributing instructions, in bytecode order.
    pub opcodes_involved: Vec<Mnemonic>,

    /// The wasteful pattern detected over the contributing mnemonics, if
    /// any.
    pub pattern: Pattern,

    /// Human-readable optimisation advice for the hotspot.
    pub recommendation: String,

    /// A concrete rewrite suggestion, present when a named pattern was
    /// detected.
    pub suggested_fix: Option<String>,
}
