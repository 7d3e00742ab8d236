//! Nameplate field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{extract, PositionalExtractor, DEFAULT_SENTINEL};

use crate::models::extraction::{ExtractionReport, ExtractionResult};
use crate::models::field::CanonicalField;

/// Trait for nameplate field extractors.
///
/// Extraction never fails: every requested field is present in the result,
/// holding either a recovered value or the sentinel.
pub trait FieldExtractor {
    /// Fields reported by this extractor, in output order.
    fn target_fields(&self) -> &[CanonicalField];

    /// Extract fields from an OCR transcript.
    fn extract(&self, text: &str) -> ExtractionResult {
        self.extract_with_report(text).result
    }

    /// Extract fields and keep classification diagnostics.
    fn extract_with_report(&self, text: &str) -> ExtractionReport;
}
