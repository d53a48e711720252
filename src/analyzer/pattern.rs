//! This module contains the detection of wasteful gas patterns over the
//! mnemonics accumulated at a single source range, together with the advice
//! text derived from them.

use serde::Serialize;

use crate::{constant::STORAGE_IN_LOOP_OPCODE_THRESHOLD, opcode::Mnemonic};

/// A wasteful pattern recognised over the instructions of one hotspot.
///
/// The vocabulary is closed and versioned; collaborators receiving an
/// unrecognised value over the wire are expected to treat it as
/// [`Pattern::None`] rather than failing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    /// Two or more `SLOAD` instructions at the same source range.
    RepeatedSload,

    /// An `SSTORE` surrounded by enough other instructions that the range
    /// looks like a loop body writing to storage.
    StorageInLoop,

    /// Three or more `SLOAD` instructions at the same source range.
    MultipleSload,

    /// No wasteful pattern detected.
    #[default]
    None,
}

impl Pattern {
    /// Detects the most specific pattern present in the provided
    /// `mnemonics`, which are the accumulated instructions of one hotspot in
    /// bytecode order.
    ///
    /// This is a best-effort heuristic: more specific patterns are checked
    /// before the generic ones they subsume.
    #[must_use]
    pub fn detect(mnemonics: &[Mnemonic]) -> Self {
        let sload_count = mnemonics.iter().filter(|m| **m == Mnemonic::SLoad).count();
        let has_sstore = mnemonics.contains(&Mnemonic::SStore);

        if has_sstore && mnemonics.len() > STORAGE_IN_LOOP_OPCODE_THRESHOLD {
            Self::StorageInLoop
        } else if sload_count >= 3 {
            Self::MultipleSload
        } else if sload_count >= 2 {
            Self::RepeatedSload
        } else {
            Self::None
        }
    }

    /// Gets the optimisation advice for the pattern, if the pattern carries
    /// any.
    #[must_use]
    pub fn recommendation(&self) -> Option<&'static str> {
        match self {
            Self::RepeatedSload => Some(
                "The same storage location is read repeatedly. Cache the value in a local \
                 variable and read it from memory instead.",
            ),
            Self::StorageInLoop => Some(
                "Storage is written inside what looks like a loop body. Accumulate the result \
                 in a memory variable and write it to storage once after the loop.",
            ),
            Self::MultipleSload => Some(
                "Several storage reads occur in this region. Load each storage variable into a \
                 local once and reuse the local.",
            ),
            Self::None => None,
        }
    }

    /// Gets a concrete rewrite suggestion for the pattern, if the pattern
    /// carries one.
    #[must_use]
    pub fn suggested_fix(&self) -> Option<&'static str> {
        match self {
            Self::RepeatedSload | Self::MultipleSload => {
                Some("uint256 cached = stateVariable; // then use `cached` below")
            }
            Self::StorageInLoop => Some(
                "uint256 accumulator = stateVariable;\n// ... mutate `accumulator` in the loop \
                 ...\nstateVariable = accumulator;",
            ),
            Self::None => None,
        }
    }
}

/// Derives the advice text for a hotspot from its detected `pattern` or,
/// absent a pattern, from the dominant class of its `mnemonics`.
#[must_use]
pub fn recommendation_for(pattern: Pattern, mnemonics: &[Mnemonic]) -> String {
    if let Some(advice) = pattern.recommendation() {
        return advice.to_string();
    }

    if mnemonics.contains(&Mnemonic::SStore) {
        "Storage writes cost up to 20000 gas. Check whether this write is necessary, or \
         whether several writes can be combined into one."
            .to_string()
    } else if mnemonics.contains(&Mnemonic::SLoad) {
        "Consider caching this storage read in memory if the value is used more than once."
            .to_string()
    } else if mnemonics.iter().any(Mnemonic::is_external_call) {
        "External calls are expensive and couple this contract to another. Check whether the \
         call can be avoided, batched, or replaced with a cheaper query."
            .to_string()
    } else {
        "Review this region for cheaper alternatives to the operations involved.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{recommendation_for, Pattern};
    use crate::opcode::Mnemonic;

    #[test]
    fn two_sloads_are_a_repeated_read() {
        let mnemonics = vec![Mnemonic::SLoad, Mnemonic::Add, Mnemonic::SLoad];
        assert_eq!(Pattern::detect(&mnemonics), Pattern::RepeatedSload);
    }

    #[test]
    fn three_sloads_are_the_more_specific_pattern() {
        let mnemonics = vec![Mnemonic::SLoad, Mnemonic::SLoad, Mnemonic::SLoad];
        assert_eq!(Pattern::detect(&mnemonics), Pattern::MultipleSload);
    }

    #[test]
    fn sstore_in_a_crowded_range_looks_like_a_loop() {
        let mnemonics = vec![
            Mnemonic::Push(1),
            Mnemonic::Dup(1),
            Mnemonic::Add,
            Mnemonic::Swap(1),
            Mnemonic::SStore,
            Mnemonic::JumpDest,
        ];
        assert_eq!(Pattern::detect(&mnemonics), Pattern::StorageInLoop);
    }

    #[test]
    fn loop_detection_takes_precedence_over_sload_counting() {
        let mnemonics = vec![
            Mnemonic::SLoad,
            Mnemonic::SLoad,
            Mnemonic::SLoad,
            Mnemonic::Add,
            Mnemonic::Dup(1),
            Mnemonic::SStore,
        ];
        assert_eq!(Pattern::detect(&mnemonics), Pattern::StorageInLoop);
    }

    #[test]
    fn quiet_ranges_have_no_pattern() {
        let mnemonics = vec![Mnemonic::Push(1), Mnemonic::Add];
        assert_eq!(Pattern::detect(&mnemonics), Pattern::None);
    }

    #[test]
    fn advice_falls_back_to_the_dominant_opcode_class() {
        let stores = vec![Mnemonic::SStore];
        assert!(recommendation_for(Pattern::None, &stores).contains("Storage writes"));

        let calls = vec![Mnemonic::Call];
        assert!(recommendation_for(Pattern::None, &calls).contains("External calls"));

        let arithmetic = vec![Mnemonic::Add];
        assert!(recommendation_for(Pattern::None, &arithmetic).contains("Review"));
    }
}
