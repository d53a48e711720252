//! This module contains the primary error type for the analyzer's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.
//!
//! # Errors are for Callers, not Data
//!
//! The analysis itself is deliberately total over its inputs: malformed
//! bytecode, short source maps, and broken trace entries all degrade into
//! counted diagnostics rather than errors (see
//! [`crate::analyzer::Diagnostics`]). The types here therefore cover only the
//! cases where the *caller* has done something unrecoverable, such as handing
//! the library an unreadable artifact file.

pub mod disassembly;
pub mod trace;

use thiserror::Error;

/// The interface result type for the library.
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Subsystems should return the more-specific
/// child error types as appropriate.
pub type Result<T> = std::result::Result<T, Error>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by
/// the clients of the library) should be members of this enum.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Errors that come from the disassembly process.
    #[error(transparent)]
    Disassembly(#[from] disassembly::Error),

    /// Errors from ingesting execution traces.
    #[error(transparent)]
    Trace(#[from] trace::Error),

    /// An unknown error, represented as a string.
    #[error("Unknown Error: {_0:?}")]
    Other(String),
}

impl Error {
    /// Constructs an unknown error with the provided `message`.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
