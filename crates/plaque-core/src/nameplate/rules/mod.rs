//! Line rules for nameplate transcripts.

pub mod aliases;
pub mod classify;
pub mod numeric;
pub mod patterns;

pub use aliases::{normalize_key, AliasTable, BUILTIN_ALIASES};
pub use classify::{
    split_lines, ClassifiedLine, LabelRule, LineClass, LineClassifier, SeparatorPolicy, ValueRule,
};
pub use numeric::{normalize_value, DECIMAL_PLACES};
pub use patterns::*;

/// A rule that recognizes one kind of transcript line.
pub trait LineRule {
    /// What a matching line yields.
    type Output;

    /// Test a single trimmed line.
    fn matches(&self, line: &str) -> Option<Self::Output>;
}
