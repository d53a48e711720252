//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use gas_attribution_analyzer::{contract::CompiledArtifact, trace::ExecutionTrace};
use serde_json::json;

/// The source of the test counter contract, from which the ranges used in
/// [`COUNTER_SOURCE_MAP`] are taken.
#[allow(unused)] // It is actually
pub const COUNTER_SOURCE: &str = "\
contract Counter {
    uint256 count;

    function increment() public {
        count = count + 1;
    }
}
";

/// The deployed bytecode of the test counter contract:
///
/// ```text
/// PUSH1 0x00, SLOAD,          \  the `count` read at 89..94
/// PUSH1 0x00, SLOAD,          /
/// PUSH1 0x01, PUSH1 0x00,     \  the assignment statement at 81..99
/// SSTORE                      /
/// ```
pub const COUNTER_BYTECODE: &str = "0x6000546000546001600055";

/// The source map aligning one entry with each of the seven instructions of
/// [`COUNTER_BYTECODE`], using ranges of [`COUNTER_SOURCE`].
pub const COUNTER_SOURCE_MAP: &str = "89:5:0:-;;;;81:18:0:-;;";

/// Constructs the compiled artifact of the test counter contract, shaped
/// like real `forge` output: deployed bytecode with its source map, a
/// one-variable storage layout, and a two-function ABI.
#[allow(unused)] // It is actually
pub fn counter_artifact() -> anyhow::Result<CompiledArtifact> {
    let document = json!({
        "abi": [
            { "name": "increment", "type": "function", "stateMutability": "nonpayable",
              "inputs": [], "outputs": [] },
            { "name": "count", "type": "function", "stateMutability": "view",
              "inputs": [], "outputs": [{ "name": "", "type": "uint256" }] },
        ],
        "deployedBytecode": {
            "object": COUNTER_BYTECODE,
            "sourceMap": COUNTER_SOURCE_MAP,
        },
        "storageLayout": {
            "storage": [
                { "label": "count", "offset": 0, "slot": "0", "type": "t_uint256" },
            ],
        },
    });

    CompiledArtifact::from_json_bytes(&serde_json::to_vec(&document)?)
}

/// Constructs the compiled artifact of an abstract contract, which has no
/// deployed bytecode at all.
#[allow(unused)] // It is actually
pub fn abstract_artifact() -> anyhow::Result<CompiledArtifact> {
    let document = json!({ "abi": [] });
    CompiledArtifact::from_json_bytes(&serde_json::to_vec(&document)?)
}

/// Constructs an execution trace that writes `value` to slot zero of the
/// counter contract, in the raw JSON shape a dev node produces.
#[allow(unused)] // It is actually
pub fn counter_write_trace(value: &str) -> anyhow::Result<ExecutionTrace> {
    let document = json!({
        "result": { "gasUsed": 22_212 },
        "structLogs": [
            { "pc": 0, "op": "PUSH1", "stack": [], "depth": 1, "gas": 50_000 },
            { "pc": 2, "op": "SLOAD", "stack": ["0x0"], "depth": 1, "gas": 49_997 },
            { "pc": 3, "op": "PUSH1", "stack": ["0x0"], "depth": 1, "gas": 47_897 },
            // The second read of the slot is warm and costs only 100 gas.
            { "pc": 5, "op": "SLOAD", "stack": ["0x0", "0x0"], "depth": 1, "gas": 47_894 },
            { "pc": 6, "op": "PUSH1", "stack": ["0x0", "0x0"], "depth": 1, "gas": 47_794 },
            { "pc": 8, "op": "PUSH1", "stack": ["0x0", value], "depth": 1, "gas": 47_791 },
            {
                "pc": 10,
                "op": "SSTORE",
                "stack": ["0x0", "0x0", value],
                "depth": 1,
                "gas": 47_788,
            },
            { "pc": 11, "op": "STOP", "stack": ["0x0"], "depth": 1, "gas": 27_788 },
        ],
    });

    Ok(ExecutionTrace::from_json(&document)?)
}
