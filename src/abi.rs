//! This module contains the minimal view of a contract's ABI that the
//! engine needs: enough of each function descriptor to decide whether a
//! simulated call can touch storage at all.

use serde::{Deserialize, Serialize};

/// One entry of a contract's ABI.
///
/// Only functions are of interest here; constructors, events and errors
/// deserialise fine but answer `false` to [`Self::is_function`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FunctionAbi {
    /// The function's name, absent for constructors and the fallback.
    #[serde(default)]
    pub name: Option<String>,

    /// The kind of ABI entry, e.g. `function`, `constructor`, `event`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// The function's declared state mutability, e.g. `view`, `payable`.
    #[serde(rename = "stateMutability", default)]
    pub state_mutability: Option<String>,

    /// The function's input parameters.
    #[serde(default)]
    pub inputs: Vec<AbiParameter>,

    /// The function's output parameters.
    #[serde(default)]
    pub outputs: Vec<AbiParameter>,
}

impl FunctionAbi {
    /// Checks whether the entry describes a callable function.
    #[must_use]
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    /// Checks whether calling the function can have no effect on storage,
    /// i.e. whether it is declared `view` or `pure`.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self.state_mutability.as_deref(), Some("view" | "pure"))
    }
}

/// A single named, typed parameter of an ABI entry.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AbiParameter {
    /// The parameter's name, which may be empty.
    #[serde(default)]
    pub name: String,

    /// The parameter's canonical ABI type, e.g. `uint256`.
    #[serde(rename = "type", default)]
    pub type_name: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::FunctionAbi;

    #[test]
    fn classifies_state_mutability() -> anyhow::Result<()> {
        let getter: FunctionAbi = serde_json::from_value(json!({
            "name": "totalSupply",
            "type": "function",
            "stateMutability": "view",
            "inputs": [],
            "outputs": [{ "name": "", "type": "uint256" }],
        }))?;
        assert!(getter.is_function());
        assert!(getter.is_read_only());

        let setter: FunctionAbi = serde_json::from_value(json!({
            "name": "transfer",
            "type": "function",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "to", "type": "address" },
                { "name": "amount", "type": "uint256" },
            ],
        }))?;
        assert!(!setter.is_read_only());

        let event: FunctionAbi = serde_json::from_value(json!({
            "name": "Transfer",
            "type": "event",
        }))?;
        assert!(!event.is_function());

        Ok(())
    }
}
