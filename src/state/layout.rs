//! This module contains the representation of the compiler's storage-layout
//! artifact, which names the variable and type living at each storage slot.

use ethnum::U256;

use crate::{
    constant::{ZERO_ADDRESS, ZERO_WORD},
    utility::parse_word,
};

/// One variable from the compiler's storage-layout artifact.
///
/// These are sourced verbatim from the compiler and are immutable for a
/// given compiled contract.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorageVariable {
    /// The storage slot the variable lives in.
    pub slot: U256,

    /// The variable's name in the source.
    pub label: String,

    /// The compiler's canonical type identifier, e.g. `t_uint256`.
    pub solidity_type: String,

    /// The byte offset of the variable within its slot, non-zero only for
    /// packed encodings.
    pub offset: u32,
}

impl StorageVariable {
    /// Gets the zero value a freshly deployed contract holds for the
    /// variable, as a hexadecimal string appropriate to its declared type.
    #[must_use]
    pub fn zero_value(&self) -> &'static str {
        if self.solidity_type.starts_with("t_address")
            || self.solidity_type.starts_with("t_contract")
        {
            ZERO_ADDRESS
        } else if self.solidity_type.starts_with("t_string")
            || self.solidity_type.starts_with("t_bytes_")
        {
            // Dynamic byte types start life as empty data.
            "0x"
        } else {
            ZERO_WORD
        }
    }
}

/// The ordered storage layout of one compiled contract.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StorageLayout {
    variables: Vec<StorageVariable>,
}

impl StorageLayout {
    /// Constructs a layout over the provided `variables`, kept in slot
    /// order with ties broken by the offset within the slot.
    #[must_use]
    pub fn new(mut variables: Vec<StorageVariable>) -> Self {
        variables.sort_by_key(|variable| (variable.slot, variable.offset));
        Self { variables }
    }

    /// Gets the variables in ascending slot order.
    #[must_use]
    pub fn variables(&self) -> &[StorageVariable] {
        &self.variables
    }

    /// Looks up the variable living at the slot denoted by the provided
    /// hexadecimal `slot` string.
    ///
    /// For slots holding several packed variables this returns the first,
    /// which is the one at offset zero.
    #[must_use]
    pub fn variable_for_slot(&self, slot: &str) -> Option<&StorageVariable> {
        let slot = parse_word(slot)?;
        self.variables.iter().find(|variable| variable.slot == slot)
    }

    /// Checks whether the layout names no variables, as is the case when
    /// the compiler was not asked to emit a storage layout.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ethnum::U256;

    use super::{StorageLayout, StorageVariable};

    fn variable(slot: u32, label: &str, solidity_type: &str) -> StorageVariable {
        StorageVariable {
            slot: U256::from(slot),
            label: label.to_string(),
            solidity_type: solidity_type.to_string(),
            offset: 0,
        }
    }

    #[test]
    fn looks_up_variables_by_hex_slot() {
        let layout = StorageLayout::new(vec![
            variable(1, "totalSupply", "t_uint256"),
            variable(0, "owner", "t_address"),
        ]);

        assert_eq!(layout.variable_for_slot("0x0").unwrap().label, "owner");
        assert_eq!(
            layout
                .variable_for_slot("0x0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap()
                .label,
            "totalSupply"
        );
        assert!(layout.variable_for_slot("0x2").is_none());
        assert!(layout.variable_for_slot("garbage").is_none());
    }

    #[test]
    fn zero_values_follow_the_declared_type() {
        assert_eq!(variable(0, "owner", "t_address").zero_value().len(), 42);
        assert_eq!(variable(0, "paused", "t_bool").zero_value(), "0x0");
        assert_eq!(variable(0, "name", "t_string_storage").zero_value(), "0x");
        assert_eq!(variable(0, "count", "t_uint256").zero_value(), "0x0");
    }
}
