//! This module contains the interpreter for the compiler's compact,
//! differential source-map encoding, which links each instruction in the
//! bytecode back to a range of the source text.
//!
//! # The Differential Grammar
//!
//! A source map is a `;`-separated list of entries of the form
//! `start:length:fileIndex:jumpKind`. Any field — or an entire entry — may be
//! omitted, in which case it inherits the value of the *immediately
//! preceding* entry. This inheritance is the encoding itself, not an
//! optimisation, so the parser is written as a fold that carries the last
//! known entry forward as an explicit accumulator.
//!
//! Newer compilers append a fifth field (modifier depth); it is ignored
//! here. A file index of `-1` denotes compiler-generated code and is
//! preserved as-is.

use serde::Serialize;
use tracing::debug;

/// The kind of control-flow transfer an instruction performs, as annotated
/// by the compiler.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum JumpKind {
    /// A jump into a function (`i`).
    Into,

    /// A return out of a function (`o`).
    Out,

    /// An ordinary instruction (`-`).
    #[default]
    Regular,
}

impl JumpKind {
    /// Parses the single-character jump marker used by the source-map
    /// grammar, returning [`None`] for markers that are not part of the
    /// vocabulary.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "i" => Some(Self::Into),
            "o" => Some(Self::Out),
            "-" => Some(Self::Regular),
            _ => None,
        }
    }
}

/// The source mapping for a single instruction index.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SourceMapping {
    /// The byte offset into the source text at which the mapped range
    /// starts.
    pub source_start: i64,

    /// The length of the mapped range in bytes.
    pub length: i64,

    /// The index of the source file containing the range, with `-1` meaning
    /// compiler-generated code.
    pub file_index: i64,

    /// The kind of control-flow transfer the instruction performs.
    pub jump_kind: JumpKind,
}

impl Default for SourceMapping {
    /// The values inherited by the very first entry when its fields are
    /// omitted.
    fn default() -> Self {
        Self {
            source_start: 0,
            length: 0,
            file_index: 0,
            jump_kind: JumpKind::Regular,
        }
    }
}

/// A dense array of source mappings, aligned one-to-one with the instruction
/// indices of the decoded bytecode.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceMap {
    entries: Vec<SourceMapping>,

    /// The number of fields that could not be parsed and fell back to the
    /// inherited value.
    pub malformed_field_count: usize,
}

impl SourceMap {
    /// Parses the provided compiler source-map `encoding`.
    ///
    /// Parsing is total: fields that fail to parse inherit the preceding
    /// entry's value and are counted in
    /// [`SourceMap::malformed_field_count`]. An empty encoding produces an
    /// empty map.
    #[must_use]
    pub fn parse(encoding: &str) -> Self {
        if encoding.is_empty() {
            return Self::default();
        }

        let mut malformed_field_count = 0;

        // The differential decoding is a fold carrying the last known entry.
        let mut last = SourceMapping::default();
        let entries = encoding
            .split(';')
            .map(|entry| {
                let mut fields = entry.split(':');

                last.source_start =
                    inherit_numeric(fields.next(), last.source_start, &mut malformed_field_count);
                last.length =
                    inherit_numeric(fields.next(), last.length, &mut malformed_field_count);
                last.file_index =
                    inherit_numeric(fields.next(), last.file_index, &mut malformed_field_count);
                last.jump_kind = match fields.next() {
                    None | Some("") => last.jump_kind,
                    Some(marker) => JumpKind::from_marker(marker).unwrap_or_else(|| {
                        malformed_field_count += 1;
                        debug!(marker, "unrecognised jump marker; treating as regular");
                        JumpKind::Regular
                    }),
                };
                // Any further fields (modifier depth) are ignored.

                last
            })
            .collect();

        Self {
            entries,
            malformed_field_count,
        }
    }

    /// Gets the mapping for the provided instruction `index`, if the map
    /// extends that far.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&SourceMapping> {
        self.entries.get(index)
    }

    /// Gets all mappings in instruction-index order.
    #[must_use]
    pub fn entries(&self) -> &[SourceMapping] {
        &self.entries
    }

    /// Gets the number of mappings in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the map contains no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decodes one numeric field of a source-map entry, inheriting `previous`
/// when the field is omitted and counting a degradation when it is present
/// but unparsable.
fn inherit_numeric(field: Option<&str>, previous: i64, malformed: &mut usize) -> i64 {
    match field {
        None | Some("") => previous,
        Some(digits) => digits.parse().unwrap_or_else(|_| {
            *malformed += 1;
            debug!(field = digits, "unparsable source-map field; inheriting");
            previous
        }),
    }
}

/// A human-readable position within a source text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SourcePosition {
    /// The zero-based line number.
    pub line: usize,

    /// The zero-based column number.
    pub column: usize,
}

/// Converts a character `offset` into the provided `source` text to a
/// line/column position by a single linear scan counting newlines.
///
/// The offset and the returned column are counted in characters, not bytes;
/// the two differ for source text containing multi-byte UTF-8. Offsets beyond
/// the end of the text clamp to the final position. This is a pure function
/// of its arguments.
#[must_use]
pub fn offset_to_position(source: &str, offset: usize) -> SourcePosition {
    let mut line = 0;
    let mut column = 0;
    for character in source.chars().take(offset) {
        if character == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    SourcePosition { line, column }
}

#[cfg(test)]
mod tests {
    use super::{offset_to_position, JumpKind, SourceMap, SourceMapping, SourcePosition};

    #[test]
    fn empty_entries_inherit_their_predecessor() {
        let map = SourceMap::parse("0:10:0:i;;25:10:0:j");

        assert_eq!(map.len(), 3);
        let expected = SourceMapping {
            source_start: 0,
            length: 10,
            file_index: 0,
            jump_kind: JumpKind::Into,
        };
        assert_eq!(map.entry(0), Some(&expected));
        assert_eq!(map.entry(1), Some(&expected), "must inherit verbatim");

        // The `j` marker is not part of the vocabulary and degrades.
        let third = map.entry(2).unwrap();
        assert_eq!(third.source_start, 25);
        assert_eq!(third.jump_kind, JumpKind::Regular);
        assert_eq!(map.malformed_field_count, 1);
    }

    #[test]
    fn partial_entries_inherit_only_omitted_fields() {
        let map = SourceMap::parse("10:5:1:-;20;:7");

        let second = map.entry(1).unwrap();
        assert_eq!(second.source_start, 20);
        assert_eq!(second.length, 5);
        assert_eq!(second.file_index, 1);

        let third = map.entry(2).unwrap();
        assert_eq!(third.source_start, 20);
        assert_eq!(third.length, 7);
        assert_eq!(third.file_index, 1);
    }

    #[test]
    fn first_entry_defaults_to_zeroes() {
        let map = SourceMap::parse(";5:2:0:-");
        assert_eq!(map.entry(0), Some(&SourceMapping::default()));
    }

    #[test]
    fn negative_file_indices_are_preserved() {
        let map = SourceMap::parse("0:3:-1:-");
        assert_eq!(map.entry(0).unwrap().file_index, -1);
    }

    #[test]
    fn modifier_depth_field_is_ignored() {
        let map = SourceMap::parse("0:3:0:i:1;4:3:0:o:0");
        assert_eq!(map.len(), 2);
        assert_eq!(map.entry(0).unwrap().jump_kind, JumpKind::Into);
        assert_eq!(map.malformed_field_count, 0);
    }

    #[test]
    fn positions_count_newlines() {
        let source = "contract A {\n    uint256 x;\n}\n";

        assert_eq!(offset_to_position(source, 0), SourcePosition { line: 0, column: 0 });
        assert_eq!(
            offset_to_position(source, 17),
            SourcePosition { line: 1, column: 4 }
        );
        // Clamped past the end.
        assert_eq!(offset_to_position(source, 10_000).line, 3);
    }

    #[test]
    fn positions_count_characters_not_bytes() {
        // The accented comment makes byte and character offsets diverge.
        let source = "// déjà vu\nuint256 x;\n";

        // Character 11 is the first one past the newline; in bytes it would
        // still sit inside the comment.
        assert_eq!(
            offset_to_position(source, 11),
            SourcePosition { line: 1, column: 0 }
        );
    }
}
