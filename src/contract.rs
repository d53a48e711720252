//! This module contains types useful for dealing with the compiled
//! artifacts of concrete contracts that you want to analyze.
//!
//! The artifact is treated as an opaque JSON document of which only the
//! relevant subset is deserialised: the deployed bytecode and its source
//! map, the storage layout, and the ABI. Everything except the document's
//! overall readability is optional — an abstract contract or library simply
//! has no deployed bytecode, and a compiler not asked for a storage layout
//! emits none.

use std::{fs::File, io::Read};

use anyhow::anyhow;
use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::{
    abi::FunctionAbi,
    state::layout::{StorageLayout, StorageVariable},
};

/// The relevant subset of one contract's compiled artifact.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledArtifact {
    bytecode: String,
    source_map: String,
    storage_layout: StorageLayout,
    abi: Vec<FunctionAbi>,
}

impl CompiledArtifact {
    /// Creates a new artifact from the file at the provided `path`.
    ///
    /// The file must be a compiled representation of a contract as output
    /// by `solc` or `forge`, usually as JSON. For the storage layout to be
    /// present you will need to ask the compiler for it; with `forge` that
    /// means adding to your `foundry.toml`:
    ///
    /// ```toml
    /// extra_output = ["storageLayout"]
    /// ```
    ///
    /// # Errors
    ///
    /// If the file cannot be read, or its contents are not a compiled
    /// contract document.
    pub fn from_file(path: impl Into<String>) -> anyhow::Result<Self> {
        let path = path.into();
        let mut file = File::open(path).map_err(|_| anyhow!("File not available"))?;
        let mut contents = vec![];
        file.read_to_end(&mut contents)
            .map_err(|_| anyhow!("File could not be read"))?;

        Self::from_json_bytes(&contents)
    }

    /// Creates a new artifact from raw compiled-contract JSON `bytes`.
    ///
    /// # Errors
    ///
    /// If the bytes are not a compiled contract document.
    pub fn from_json_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let raw: RawArtifact = serde_json::from_slice(bytes)
            .map_err(|_| anyhow!("Could not parse compiled contract."))?;
        Ok(Self::from_raw(raw))
    }

    /// Creates a new artifact from already-extracted parts.
    #[must_use]
    pub fn new(
        bytecode: impl Into<String>,
        source_map: impl Into<String>,
        storage_layout: StorageLayout,
        abi: Vec<FunctionAbi>,
    ) -> Self {
        Self {
            bytecode: bytecode.into(),
            source_map: source_map.into(),
            storage_layout,
            abi,
        }
    }

    /// Gets the deployed bytecode as a hex string, which is empty for
    /// abstract contracts and libraries.
    #[must_use]
    pub fn bytecode(&self) -> &str {
        &self.bytecode
    }

    /// Gets the compiler source map for the deployed bytecode.
    #[must_use]
    pub fn source_map(&self) -> &str {
        &self.source_map
    }

    /// Gets the contract's storage layout.
    #[must_use]
    pub fn storage_layout(&self) -> &StorageLayout {
        &self.storage_layout
    }

    /// Gets the contract's ABI entries.
    #[must_use]
    pub fn abi(&self) -> &[FunctionAbi] {
        &self.abi
    }

    /// Looks up the ABI entry for the function with the provided `name`.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionAbi> {
        self.abi
            .iter()
            .find(|entry| entry.is_function() && entry.name.as_deref() == Some(name))
    }

    /// Checks whether the contract has no deployed bytecode, as is the
    /// case for abstract contracts and libraries. Such contracts analyze
    /// to "nothing", not to an error.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        let digits = crate::utility::strip_hex_prefix(self.bytecode.trim());
        digits.is_empty()
    }

    fn from_raw(raw: RawArtifact) -> Self {
        let bytecode = raw
            .deployed_bytecode
            .as_ref()
            .map(|b| b.object.clone())
            .unwrap_or_default();
        let source_map = raw
            .deployed_bytecode
            .as_ref()
            .and_then(|b| b.source_map.clone())
            .unwrap_or_default();

        let variables = raw
            .storage_layout
            .map(|layout| {
                layout
                    .storage
                    .into_iter()
                    .filter_map(RawStorageEntry::into_variable)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            bytecode,
            source_map,
            storage_layout: StorageLayout::new(variables),
            abi: raw.abi,
        }
    }
}

/// A wrapper for the parts of the JSON representation of the compiled
/// contract on disk that we care about.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    abi: Vec<FunctionAbi>,
    #[serde(default)]
    deployed_bytecode: Option<RawDeployedBytecode>,
    #[serde(default)]
    storage_layout: Option<RawStorageLayout>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDeployedBytecode {
    #[serde(default)]
    object: String,
    #[serde(default)]
    source_map: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
struct RawStorageLayout {
    #[serde(default)]
    storage: Vec<RawStorageEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
struct RawStorageEntry {
    #[serde(default)]
    label: String,
    #[serde(default)]
    offset: u32,
    /// The compiler emits the slot as a decimal string.
    #[serde(default)]
    slot: String,
    #[serde(rename = "type", default)]
    type_name: String,
}

impl RawStorageEntry {
    /// Converts the raw entry into a [`StorageVariable`], dropping entries
    /// whose slot is not a decimal number.
    fn into_variable(self) -> Option<StorageVariable> {
        let slot = U256::from_str_radix(&self.slot, 10).ok()?;
        Some(StorageVariable {
            slot,
            label: self.label,
            solidity_type: self.type_name,
            offset: self.offset,
        })
    }
}
