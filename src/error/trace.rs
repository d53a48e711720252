//! This module contains the error type that pertains to ingesting execution
//! traces.
//!
//! Individual malformed trace entries are skipped and counted during state
//! reconstruction rather than erroring; these errors cover traces whose
//! overall shape is unusable.

use thiserror::Error;

/// Errors that occur when ingesting a raw execution trace.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The trace document is not a JSON object")]
    NotAnObject,

    #[error("The `structLogs` field is missing or is not a list")]
    StructLogsNotAList,
}

/// The result type for functions that may return trace-ingestion errors.
pub type Result<T> = std::result::Result<T, Error>;
