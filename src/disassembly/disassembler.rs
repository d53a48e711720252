//! This module contains the decoder for turning a stream of bytes into an
//! [`InstructionStream`].
//!
//! # Totality
//!
//! Decoding never fails on the *content* of its input. Unknown bytes decode
//! to [`Mnemonic::Unknown`], odd-length hex loses its trailing nibble, and a
//! push whose declared width runs past the end of the bytecode keeps however
//! much data is present. Every such degradation is counted on the resulting
//! stream so that callers can surface a warning without retrying.
//!
//! # CBOR Metadata
//!
//! Deployed bytecode usually ends in CBOR metadata, which is not code at all.
//! No attempt is made to strip it beforehand; its bytes simply decode to
//! `UNKNOWN` (or misparse as ordinary instructions), which is harmless as the
//! analyzer attributes no source mapping to them. This is more robust than
//! chasing changes in the metadata format.

use tracing::debug;

use crate::{
    disassembly::{Instruction, InstructionStream},
    error::disassembly::{Error, Result},
    opcode::Mnemonic,
    utility::strip_hex_prefix,
};

/// Disassembles the input `bytes` into an [`InstructionStream`].
///
/// The offsets of the produced instructions are strictly increasing, and the
/// bytes consumed by instructions and their immediates never exceed the input
/// length.
///
/// # Errors
///
/// If the bytecode is too large for its offsets to be representable. Note
/// that no property of the byte *values* can cause an error.
pub fn disassemble(bytes: &[u8]) -> Result<InstructionStream> {
    if bytes.len() > u32::MAX as usize {
        return Err(Error::BytecodeTooLarge);
    }

    let mut instructions = Vec::with_capacity(bytes.len());
    let mut unknown_opcode_count = 0;
    let mut truncated_push_count = 0;

    let mut index = 0;
    while index < bytes.len() {
        // The guard above makes this cast lossless.
        #[allow(clippy::cast_possible_truncation)]
        let offset = index as u32;
        let mnemonic = Mnemonic::from_byte(bytes[index]);

        // Inline push data must be consumed here so that it is never
        // mis-decoded as instructions in its own right.
        let declared_size = mnemonic.immediate_size();
        let data_start = index + 1;
        let data_end = usize::min(data_start + declared_size, bytes.len());
        let immediate = bytes[data_start..data_end].to_vec();

        if immediate.len() < declared_size {
            truncated_push_count += 1;
            debug!(
                offset,
                declared_size,
                actual = immediate.len(),
                "bytecode ends inside a push; keeping the partial immediate"
            );
        }
        if mnemonic.is_unknown() {
            unknown_opcode_count += 1;
        }

        instructions.push(Instruction {
            offset,
            mnemonic,
            immediate,
        });
        index = data_end;
    }

    let mut stream = InstructionStream::new(instructions);
    stream.unknown_opcode_count = unknown_opcode_count;
    stream.truncated_push_count = truncated_push_count;
    Ok(stream)
}

/// Disassembles the provided hex string (with or without the `0x` prefix)
/// into an [`InstructionStream`].
///
/// An empty string — the compiler's representation of an abstract contract
/// or library — produces an empty stream, not an error. Odd-length input
/// loses its final nibble, and two-character groups that are not valid hex
/// are skipped; both degradations are counted on the stream.
///
/// # Errors
///
/// If the decoded bytecode is too large for its offsets to be representable.
pub fn disassemble_hex(hex: &str) -> Result<InstructionStream> {
    let digits = strip_hex_prefix(hex.trim()).as_bytes();

    let dropped_trailing_nibble = digits.len() % 2 != 0;
    if dropped_trailing_nibble {
        debug!("hex input has odd length; dropping the trailing nibble");
    }

    let mut bytes = Vec::with_capacity(digits.len() / 2);
    let mut invalid_hex_pair_count = 0;
    for pair in digits.chunks_exact(2) {
        let parsed = std::str::from_utf8(pair)
            .ok()
            .and_then(|pair| u8::from_str_radix(pair, 16).ok());
        match parsed {
            Some(byte) => bytes.push(byte),
            None => {
                invalid_hex_pair_count += 1;
                debug!("skipping unparsable hex pair");
            }
        }
    }

    let mut stream = disassemble(&bytes)?;
    stream.invalid_hex_pair_count = invalid_hex_pair_count;
    stream.dropped_trailing_nibble = dropped_trailing_nibble;
    Ok(stream)
}
