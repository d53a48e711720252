//! This module contains the types that represent decoded bytecode, namely
//! [`Instruction`] and the [`InstructionStream`] produced by the
//! [`disassembler`].

pub mod disassembler;

pub use disassembler::{disassemble, disassemble_hex};

use crate::opcode::Mnemonic;

/// A single decoded instruction at a fixed byte offset in the bytecode.
///
/// Instructions are immutable once decoded; a decode pass produces them
/// exactly once and the rest of the pipeline only reads them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    /// The byte offset of the instruction within the bytecode.
    pub offset: u32,

    /// The decoded instruction mnemonic.
    pub mnemonic: Mnemonic,

    /// The inline push data that follows the instruction byte.
    ///
    /// This is empty for everything except the `PUSH` family, and may be
    /// shorter than the declared push width when the bytecode ends in the
    /// middle of a push (solc has been known to emit such tails).
    pub immediate: Vec<u8>,
}

impl Instruction {
    /// Gets the number of immediate data bytes actually present after the
    /// instruction byte.
    #[must_use]
    pub fn immediate_length(&self) -> usize {
        self.immediate.len()
    }
}

impl std::fmt::Display for Instruction {
    /// Formats the instruction as assembly, with any immediate data rendered
    /// as hex after the mnemonic (e.g. `PUSH1 0x01`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.immediate.is_empty() {
            write!(f, "{}", self.mnemonic)
        } else {
            write!(f, "{} 0x{}", self.mnemonic, hex::encode(&self.immediate))
        }
    }
}

/// The ordered sequence of instructions decoded from one bytecode blob,
/// along with counters describing how much of the input had to be degraded
/// to keep decoding total.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,

    /// The number of bytes that decoded to [`Mnemonic::Unknown`].
    pub unknown_opcode_count: usize,

    /// The number of `PUSH` instructions whose declared data width ran past
    /// the end of the bytecode.
    pub truncated_push_count: usize,

    /// The number of two-character hex groups that could not be parsed as a
    /// byte and were skipped.
    pub invalid_hex_pair_count: usize,

    /// Whether the hex input had odd length, forcing the trailing nibble to
    /// be dropped.
    pub dropped_trailing_nibble: bool,
}

impl InstructionStream {
    /// Constructs a stream over the provided `instructions` with all
    /// degradation counters zeroed.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    /// Gets the decoded instructions in bytecode order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Gets the number of decoded instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Checks whether the stream contains no instructions, as is the case
    /// for abstract contracts and libraries that compile to no deployed
    /// bytecode.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
