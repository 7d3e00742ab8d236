//! Core library for solar panel nameplate OCR processing.
//!
//! This crate provides:
//! - Alias normalization for OCR-mangled field labels (Voc, Isc, Pmax, Vpm, Ipm)
//! - Line classification into labels, values and noise
//! - Positional label/value pairing with one-decimal numeric canonicalization
//! - Extraction result models and JSON configuration
//!
//! Recognizing glyphs is left to an external OCR provider; this crate only
//! turns its transcript into structured fields.

pub mod error;
pub mod models;
pub mod nameplate;

pub use error::{ExtractionError, PlaqueError, Result};
pub use models::config::{ExportConfig, ExtractionConfig, PlaqueConfig};
pub use models::extraction::{ApiResponse, ExtractionReport, ExtractionResult, FieldValue, Pairing};
pub use models::field::CanonicalField;
pub use nameplate::rules::{AliasTable, ClassifiedLine, LineClass, LineClassifier, SeparatorPolicy};
pub use nameplate::{extract, FieldExtractor, PositionalExtractor, DEFAULT_SENTINEL};
