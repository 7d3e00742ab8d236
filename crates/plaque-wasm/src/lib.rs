//! WASM bindings for solar nameplate OCR.
//!
//! Browsers run OCR themselves (or receive a transcript from a service) and
//! hand the text to these bindings for field extraction.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use plaque_core::nameplate::rules;
use plaque_core::{
    CanonicalField, ExtractionConfig, FieldExtractor, PositionalExtractor, SeparatorPolicy,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract the five nameplate fields from an OCR transcript.
///
/// Returns a plain object mapping field names to values, with
/// "Non détecté" for fields that were not found.
#[wasm_bindgen]
pub fn extract_fields(text: &str) -> Result<JsValue, JsValue> {
    to_js(&PositionalExtractor::new().extract(text))
}

/// Extract fields in the API body shape, `null` for fields not found.
#[wasm_bindgen]
pub fn extract_fields_api(text: &str) -> Result<JsValue, JsValue> {
    to_js(&PositionalExtractor::new().extract(text).api_response())
}

/// Normalize a value line (e.g., "9,1 A" becomes "9.1").
///
/// Text that is not a number is returned unchanged.
#[wasm_bindgen]
pub fn normalize_value(raw: &str) -> String {
    match rules::normalize_value(raw).as_text() {
        Some(text) => text.to_string(),
        None => raw.to_string(),
    }
}

/// Reduce a label line to its alias lookup key (e.g., " V oc: " becomes "voc").
#[wasm_bindgen]
pub fn normalize_key(label: &str) -> String {
    rules::normalize_key(label)
}

/// Configurable nameplate extractor for browser use.
#[wasm_bindgen]
pub struct NameplateExtractor {
    config: ExtractionConfig,
    extractor: PositionalExtractor,
}

#[wasm_bindgen]
impl NameplateExtractor {
    /// Create an extractor with the built-in aliases and all five fields.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            extractor: PositionalExtractor::new(),
        }
    }

    /// Restrict and order the reported fields, e.g. `["Voc", "Pmax"]`.
    #[wasm_bindgen]
    pub fn set_fields(&mut self, fields: JsValue) -> Result<(), JsValue> {
        let names: Vec<String> = serde_wasm_bindgen::from_value(fields)?;
        let fields = names
            .iter()
            .map(|name| name.parse::<CanonicalField>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_js_error)?;

        self.update(|config| config.target_fields = fields)
    }

    /// Set the text reported for fields that were not detected.
    #[wasm_bindgen]
    pub fn set_sentinel(&mut self, sentinel: &str) -> Result<(), JsValue> {
        self.update(|config| config.sentinel = sentinel.to_string())
    }

    /// Require label lines to end with ':'.
    #[wasm_bindgen]
    pub fn set_require_separator(&mut self, required: bool) -> Result<(), JsValue> {
        let separator = if required {
            SeparatorPolicy::Required
        } else {
            SeparatorPolicy::Optional
        };
        self.update(|config| config.separator = separator)
    }

    /// Recognize another spelling of a field label.
    #[wasm_bindgen]
    pub fn add_alias(&mut self, alias: &str, field: &str) -> Result<(), JsValue> {
        let field = field.parse::<CanonicalField>().map_err(to_js_error)?;
        self.update(|config| {
            config.extra_aliases.insert(alias.to_string(), field);
        })
    }

    /// Extract fields from a transcript.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(text))
    }

    /// Extract fields with line classification, pairings and warnings.
    #[wasm_bindgen]
    pub fn extract_with_report(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract_with_report(text))
    }

    /// Current configuration as a JSON string.
    #[wasm_bindgen]
    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.config).map_err(to_js_error)
    }
}

impl NameplateExtractor {
    /// Apply a change and rebuild, leaving the extractor untouched on error.
    fn update(&mut self, change: impl FnOnce(&mut ExtractionConfig)) -> Result<(), JsValue> {
        let mut config = self.config.clone();
        change(&mut config);

        self.extractor = PositionalExtractor::from_config(&config).map_err(to_js_error)?;
        self.config = config;
        Ok(())
    }
}

impl Default for NameplateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
