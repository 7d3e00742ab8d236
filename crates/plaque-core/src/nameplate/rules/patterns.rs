//! Common regex patterns for nameplate transcripts.

use lazy_static::lazy_static;
use regex::Regex;

/// Source of the built-in value line pattern.
///
/// A whole line holding a number with an optional decimal part, then an
/// optional run of unit glyphs: `45.6 V`, `9,1A`, `415W`, `18 %`.
pub const DEFAULT_VALUE_PATTERN: &str = r"(?i)^[0-9]+[.,]?[0-9]*\s*[a-z%Ωµ]*$";

/// Characters that may close a label line.
pub const LABEL_SEPARATORS: &[char] = &[':', '：'];

lazy_static! {
    pub static ref VALUE_LINE: Regex = Regex::new(DEFAULT_VALUE_PATTERN).unwrap();

    // Everything numeric normalization throws away
    pub static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.,\-]").unwrap();
}
