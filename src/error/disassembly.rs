//! This module contains the error type that pertains to the disassembly
//! process.
//!
//! Note that most problems with input bytecode are not errors at all: unknown
//! bytes, odd-length hex and truncated pushes all degrade into diagnostics as
//! decoding is total. Only limits that make the instruction stream itself
//! unrepresentable are errors.

use thiserror::Error;

/// Errors that occur during the process of disassembling bytecode into the
/// library's [`crate::disassembly::InstructionStream`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The length of the bytecode exceeded {}", u32::MAX)]
    BytecodeTooLarge,
}

/// The result type for functions that may return disassembly errors.
pub type Result<T> = std::result::Result<T, Error>;
