//! This module contains the data model for raw execution traces as produced
//! by a development node's `debug_traceTransaction`-style endpoints.
//!
//! Only the fields the engine actually interprets are modelled; the rest of
//! the trace document is ignored on ingestion. Individual entries that do
//! not match the expected shape are dropped and counted rather than failing
//! the whole trace.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::trace::{Error, Result};

/// A raw execution trace for one call or transaction.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ExecutionTrace {
    /// The top-level result of the traced call, where the producer supplied
    /// one.
    #[serde(default)]
    pub result: Option<TraceResult>,

    /// The ordered per-instruction log entries.
    #[serde(rename = "structLogs", default)]
    pub struct_logs: Vec<StructLog>,

    /// The number of entries in the raw document that did not match the
    /// expected entry shape and were dropped during ingestion.
    #[serde(skip)]
    pub malformed_entry_count: usize,
}

impl ExecutionTrace {
    /// Ingests a trace from an opaque JSON `document`.
    ///
    /// Entries of `structLogs` that do not match the expected shape are
    /// skipped and counted in [`Self::malformed_entry_count`]; only a
    /// document whose overall shape is unusable is an error.
    ///
    /// # Errors
    ///
    /// If the document is not an object, or its `structLogs` field is
    /// missing or not a list.
    pub fn from_json(document: &Value) -> Result<Self> {
        let object = document.as_object().ok_or(Error::NotAnObject)?;
        let logs = object
            .get("structLogs")
            .and_then(Value::as_array)
            .ok_or(Error::StructLogsNotAList)?;

        let mut struct_logs = Vec::with_capacity(logs.len());
        let mut malformed_entry_count = 0;
        for entry in logs {
            match serde_json::from_value::<StructLog>(entry.clone()) {
                Ok(log) => struct_logs.push(log),
                Err(_) => {
                    malformed_entry_count += 1;
                    debug!("dropping malformed structLogs entry");
                }
            }
        }

        let result = object
            .get("result")
            .and_then(|result| serde_json::from_value(result.clone()).ok());

        Ok(Self {
            result,
            struct_logs,
            malformed_entry_count,
        })
    }

    /// Gets the total gas consumed by the traced call, where the producer
    /// recorded it.
    #[must_use]
    pub fn gas_used(&self) -> Option<u64> {
        self.result.as_ref().map(|result| result.gas_used)
    }
}

/// The top-level result object of a trace.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct TraceResult {
    /// The total gas consumed by the traced call.
    #[serde(rename = "gasUsed", default)]
    pub gas_used: u64,
}

/// One entry of a trace's `structLogs`: the machine state observed before a
/// single instruction executed.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct StructLog {
    /// The program counter at which the instruction sits.
    pub pc: u64,

    /// The instruction's mnemonic as spelled by the trace producer.
    pub op: String,

    /// The machine stack, bottom first, as hexadecimal word strings.
    #[serde(default)]
    pub stack: Vec<String>,

    /// The call depth at which the instruction executed.
    #[serde(default)]
    pub depth: u64,

    /// The gas remaining before the instruction executed.
    #[serde(default)]
    pub gas: u64,
}
