//! Error types for the plaque-core library.

use thiserror::Error;

/// Main error type for the plaque library.
#[derive(Error, Debug)]
pub enum PlaqueError {
    /// Extractor construction or contract error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while building an extractor.
///
/// Extraction itself never fails: unmatched fields degrade to the sentinel
/// and unparseable values degrade to their raw text. These variants only
/// cover caller mistakes in the rule set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A field name that is not one of the canonical fields.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// An alias with no letters left after normalization.
    #[error("invalid alias {0:?}: no letters after normalization")]
    InvalidAlias(String),

    /// The alias table has no entries, so no label could ever match.
    #[error("alias table is empty")]
    EmptyAliasTable,

    /// The value pattern failed to compile.
    #[error("invalid value pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type for the plaque library.
pub type Result<T> = std::result::Result<T, PlaqueError>;
