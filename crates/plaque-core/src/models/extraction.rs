//! Extraction results and diagnostics.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::field::CanonicalField;
use crate::nameplate::rules::ClassifiedLine;

/// Value recovered for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Number rounded to one decimal place.
    Numeric(String),
    /// Matched text kept verbatim because it did not parse as a number.
    Raw(String),
    /// No label/value pair was found for the field.
    NotFound,
}

impl FieldValue {
    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// Text of the value, `None` when the field was not found.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Numeric(s) | Self::Raw(s) => Some(s),
            Self::NotFound => None,
        }
    }
}

/// Structured output of one extraction call.
///
/// Holds exactly one entry per requested field, in the order the fields
/// were requested. Missing fields render as the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    entries: Vec<(CanonicalField, FieldValue)>,
    sentinel: String,
}

impl ExtractionResult {
    pub fn new(entries: Vec<(CanonicalField, FieldValue)>, sentinel: impl Into<String>) -> Self {
        Self {
            entries,
            sentinel: sentinel.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Recovered value for a field, `None` if the field was not requested.
    pub fn get(&self, field: CanonicalField) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }

    /// Display text for a field: the value, or the sentinel when missing.
    pub fn value(&self, field: CanonicalField) -> Option<&str> {
        self.get(field).map(|value| self.render(value))
    }

    /// Iterate over `(field, display text)` in requested order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> + '_ {
        self.entries
            .iter()
            .map(|(field, value)| (*field, self.render(value)))
    }

    pub fn entries(&self) -> &[(CanonicalField, FieldValue)] {
        &self.entries
    }

    /// Requested fields that received the sentinel.
    pub fn missing_fields(&self) -> Vec<CanonicalField> {
        self.entries
            .iter()
            .filter(|(_, value)| !value.is_found())
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_found())
    }

    /// Values in requested order, ready to append as a spreadsheet row.
    pub fn to_row(&self) -> Vec<String> {
        self.iter().map(|(_, text)| text.to_string()).collect()
    }

    /// Field names and display text in requested order.
    pub fn to_map(&self) -> Vec<(&'static str, String)> {
        self.iter()
            .map(|(field, text)| (field.as_str(), text.to_string()))
            .collect()
    }

    /// Body shape of the extraction endpoint, with `null` for missing fields.
    pub fn api_response(&self) -> ApiResponse {
        ApiResponse {
            fields: self
                .entries
                .iter()
                .map(|(field, value)| (*field, value.as_text().map(str::to_string)))
                .collect(),
        }
    }

    fn render<'a>(&'a self, value: &'a FieldValue) -> &'a str {
        value.as_text().unwrap_or(&self.sentinel)
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, text) in self.iter() {
            map.serialize_entry(field.as_str(), text)?;
        }
        map.end()
    }
}

/// `{"fields": {...}}` response with `null` for undetected fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    #[serde(serialize_with = "serialize_nullable_fields")]
    pub fields: Vec<(CanonicalField, Option<String>)>,
}

fn serialize_nullable_fields<S: Serializer>(
    fields: &[(CanonicalField, Option<String>)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (field, value) in fields {
        map.serialize_entry(field.as_str(), value)?;
    }
    map.end()
}

/// One positional label/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing {
    /// Field named by the label.
    pub field: CanonicalField,
    /// Value line as it appeared in the transcript.
    pub raw: String,
    /// Normalized value.
    pub value: FieldValue,
    /// False when an earlier label for the same field already claimed a value.
    pub used: bool,
}

/// Extraction result with classification diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Transcript the extraction ran on.
    pub raw_text: String,
    /// Every non-empty line with its classification.
    pub lines: Vec<ClassifiedLine>,
    /// Label lines in order of appearance, duplicates included.
    pub labels: Vec<CanonicalField>,
    /// Value lines in order of appearance.
    pub values: Vec<String>,
    /// Pairs formed by position.
    pub pairings: Vec<Pairing>,
    /// Final field mapping.
    pub result: ExtractionResult,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}
