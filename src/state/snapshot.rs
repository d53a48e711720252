//! This module contains the value types of the storage-state model: the
//! individual [`StateChange`] records, the [`StateSnapshot`]s that group
//! them, and the [`VariableState`] projection handed to collaborators.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::Value;

use crate::utility::{parse_word, significant_hex_digits};

/// The operation that produced a state change.
///
/// The vocabulary is closed; collaborators receiving an unrecognised value
/// over the wire are expected to treat it as an unspecified write rather
/// than failing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ChangeOperation {
    /// An `SSTORE` observed in an execution trace.
    #[serde(rename = "SSTORE")]
    SStore,

    /// A synthesised post-deployment zero value.
    #[serde(rename = "INITIAL")]
    Initial,

    /// A direct write applied outside a trace.
    #[serde(rename = "SET")]
    Set,
}

impl Display for ChangeOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SStore => write!(f, "SSTORE"),
            Self::Initial => write!(f, "INITIAL"),
            Self::Set => write!(f, "SET"),
        }
    }
}

/// A single observed or synthesised write to a storage slot.
///
/// Change records are created only by the state reconstructor and are never
/// mutated afterwards; the change history is append-only.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    /// The written slot as a canonical hexadecimal string.
    pub slot: String,

    /// The value held by the slot before the write.
    pub old_value: String,

    /// The value held by the slot after the write.
    pub new_value: String,

    /// The name of the variable living at the slot, where the storage
    /// layout names one.
    pub variable_name: Option<String>,

    /// The variable's declared type, or a coarse inference from the value's
    /// shape when no layout is available.
    pub type_info: Option<String>,

    /// The operation that produced the change.
    pub operation: ChangeOperation,

    /// The program counter at which the write executed.
    pub program_counter: u64,

    /// The call depth at which the write executed.
    pub call_depth: u64,

    /// The hash of the transaction the write belongs to, where known.
    pub transaction_hash: Option<String>,
}

/// An ordered snapshot of the state changes produced by one operation.
///
/// Snapshots form an append-only, strictly ordered sequence; the state "at"
/// a snapshot is defined as the fold of all changes up to and including it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// The snapshot's position in the history; monotonically increasing.
    pub id: u64,

    /// The wall-clock time at which the snapshot was recorded, in
    /// milliseconds since the Unix epoch.
    pub timestamp: u64,

    /// The changes the operation produced, in observation order.
    pub changes: Vec<StateChange>,

    /// The hash of the transaction the snapshot describes, where known.
    pub transaction_hash: Option<String>,

    /// Free-form metadata supplied by the caller, e.g. the function that
    /// was invoked.
    pub context_info: Value,
}

/// The projected state of one variable at a chosen point in the history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableState {
    /// The variable's type, as recorded on the contributing change.
    #[serde(rename = "type")]
    pub type_info: Option<String>,

    /// The raw hexadecimal value of the last write.
    pub value: String,

    /// A human-readable rendering of [`Self::value`].
    pub display_value: String,

    /// The value the variable held before the last write.
    pub previous_value: Option<String>,

    /// The slot the variable lives in.
    pub slot: String,

    /// The operation that produced the last write.
    pub operation: ChangeOperation,
}

/// Makes a coarse guess at the type of an unattributed storage value from
/// its shape alone.
///
/// A zero or one could be a boolean as easily as a number; a value with
/// exactly twenty significant bytes is most likely an address; anything
/// else is indistinguishable between a number and raw bytes.
#[must_use]
pub fn infer_type(value: &str) -> String {
    match parse_word(value) {
        Some(word) if word <= ethnum::U256::ONE => "bool | uint256".to_string(),
        Some(_) if significant_hex_digits(value) == crate::constant::ADDRESS_HEX_CHARS => {
            "address".to_string()
        }
        Some(_) => "uint256 | bytes32".to_string(),
        None => "bytes".to_string(),
    }
}

/// Renders a raw hexadecimal `value` for display, guided by the variable's
/// `type_info` where one is known.
#[must_use]
pub fn display_value(type_info: Option<&str>, value: &str) -> String {
    let Some(word) = parse_word(value) else {
        return value.to_string();
    };

    let is_boolean = type_info.is_some_and(|t| t.starts_with("t_bool") || t.starts_with("bool"));
    if is_boolean {
        return (word != ethnum::U256::ZERO).to_string();
    }

    let is_address =
        type_info.is_some_and(|t| t.starts_with("t_address") || t.starts_with("address"));
    if is_address {
        return format!("0x{word:040x}");
    }

    // Numbers read best in decimal.
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::{display_value, infer_type};

    #[test]
    fn infers_coarse_types_from_value_shapes() {
        assert_eq!(infer_type("0x0"), "bool | uint256");
        assert_eq!(infer_type("0x1"), "bool | uint256");
        assert_eq!(
            infer_type("0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"),
            "address"
        );
        assert_eq!(infer_type("0x2a"), "uint256 | bytes32");
        assert_eq!(infer_type("garbage"), "bytes");
    }

    #[test]
    fn renders_values_by_declared_type() {
        assert_eq!(display_value(Some("t_bool"), "0x1"), "true");
        assert_eq!(display_value(Some("t_bool"), "0x0"), "false");
        assert_eq!(display_value(Some("t_uint256"), "0x2a"), "42");
        assert_eq!(
            display_value(Some("t_address"), "0x1"),
            "0x0000000000000000000000000000000000000001"
        );
        assert_eq!(display_value(None, "not-hex"), "not-hex");
    }
}
