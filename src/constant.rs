//! This module contains constants that are needed throughout the codebase.

/// The base byte value for the `PUSH` opcode, for `N > 0`.
///
/// This is constructed such that for `PUSHN`, `PUSH_OPCODE_BASE_VALUE` + `N`
/// equals the byte value for the corresponding `PUSH` opcode.
pub const PUSH_OPCODE_BASE_VALUE: u8 = 0x5f;

/// The base byte value for the `DUP` opcode.
///
/// This is constructed such that for `DUPN`, `DUP_OPCODE_BASE_VALUE` + `N`
/// equals the byte value for the corresponding `DUP` opcode.
pub const DUP_OPCODE_BASE_VALUE: u8 = 0x7f;

/// The base byte value for the `SWAP` opcode.
///
/// This is constructed such that for `SWAPN`, `SWAP_OPCODE_BASE_VALUE` + `N`
/// equals the byte value for the corresponding `SWAP` opcode.
pub const SWAP_OPCODE_BASE_VALUE: u8 = 0x8f;

/// The base byte value for the `LOG` opcode.
///
/// This is constructed such that for `LOGN`, `LOG_OPCODE_BASE_VALUE` + `N`
/// equals the byte value for the corresponding `LOG` opcode.
pub const LOG_OPCODE_BASE_VALUE: u8 = 0xa0;

/// The maximum number of bytes that can be pushed at once using the `PUSH`
/// opcode.
pub const PUSH_OPCODE_MAX_BYTES: u8 = 32;

/// Accumulated gas below this figure leaves a hotspot classified as optimal.
pub const SEVERITY_WARNING_THRESHOLD: u64 = 1_000;

/// Accumulated gas at or above [`SEVERITY_WARNING_THRESHOLD`] but below this
/// figure classifies a hotspot as a warning.
pub const SEVERITY_HIGH_THRESHOLD: u64 = 5_000;

/// Accumulated gas at or above this figure classifies a hotspot as critical.
pub const SEVERITY_CRITICAL_THRESHOLD: u64 = 20_000;

/// The number of accumulated opcodes at a single source range beyond which a
/// co-located `SSTORE` is treated as storage traffic inside a loop body.
pub const STORAGE_IN_LOOP_OPCODE_THRESHOLD: usize = 5;

/// The zero word as a canonical hexadecimal string.
///
/// Used as the assumed prior value for storage slots that have not been
/// written within the observed trace.
pub const ZERO_WORD: &str = "0x0";

/// The canonical zero value for address-typed storage variables.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// The number of hexadecimal characters in an ABI-encoded address once
/// stripped of leading zeroes down to its significant bytes.
pub const ADDRESS_HEX_CHARS: usize = 40;
