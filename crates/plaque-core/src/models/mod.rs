//! Data models for nameplate extraction.

pub mod config;
pub mod extraction;
pub mod field;

pub use config::{ExportConfig, ExtractionConfig, PlaqueConfig};
pub use extraction::{ApiResponse, ExtractionReport, ExtractionResult, FieldValue, Pairing};
pub use field::CanonicalField;
