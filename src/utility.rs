//! Utility functions useful throughout the codebase, mostly concerned with
//! the hexadecimal word strings that appear in traces and storage values.

use ethnum::U256;

/// Strips a leading `0x` or `0X` marker from the provided hex `string`, if
/// one is present.
#[must_use]
pub fn strip_hex_prefix(string: &str) -> &str {
    string
        .strip_prefix("0x")
        .or_else(|| string.strip_prefix("0X"))
        .unwrap_or(string)
}

/// Parses a hexadecimal word string (with or without the `0x` prefix) into a
/// [`U256`], returning [`None`] if the string is not valid hexadecimal or is
/// too large for a word.
#[must_use]
pub fn parse_word(string: &str) -> Option<U256> {
    let digits = strip_hex_prefix(string.trim());
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Checks whether two hexadecimal word strings denote the same value.
///
/// The comparison is numeric where possible, so `0x0`, `0x00` and the
/// fully-padded zero word all compare equal. Strings that do not parse as
/// words fall back to a case-insensitive textual comparison.
#[must_use]
pub fn words_equal(lhs: &str, rhs: &str) -> bool {
    match (parse_word(lhs), parse_word(rhs)) {
        (Some(l), Some(r)) => l == r,
        _ => strip_hex_prefix(lhs).eq_ignore_ascii_case(strip_hex_prefix(rhs)),
    }
}

/// Canonicalises a hexadecimal word string to the form `0x` followed by
/// lowercase digits with leading zeroes removed.
///
/// Strings that do not parse as words are returned unchanged.
#[must_use]
pub fn canonical_word(string: &str) -> String {
    match parse_word(string) {
        Some(word) => format!("{word:#x}"),
        None => string.to_string(),
    }
}

/// Counts the hexadecimal digits of the provided word string that remain
/// once leading zeroes are stripped.
///
/// This is used to make a coarse guess at the type of an unattributed
/// storage value from its shape alone.
#[must_use]
pub fn significant_hex_digits(string: &str) -> usize {
    let digits = strip_hex_prefix(string.trim());
    let trimmed = digits.trim_start_matches('0');
    trimmed.len()
}
