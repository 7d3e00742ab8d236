//! Line splitting and classification.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::aliases::AliasTable;
use super::patterns::{LABEL_SEPARATORS, VALUE_LINE};
use super::LineRule;
use crate::error::ExtractionError;
use crate::models::field::CanonicalField;

/// Whether a label line must end with a separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorPolicy {
    /// `Voc` and `Voc:` are both labels.
    #[default]
    Optional,
    /// Only `Voc:` is a label.
    Required,
}

/// Kind of a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "class", content = "field", rename_all = "snake_case")]
pub enum LineClass {
    /// Names a field.
    Label(CanonicalField),
    /// Holds a number with an optional unit.
    Value,
    /// Neither.
    Other,
}

/// A non-empty, trimmed transcript line and its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLine {
    /// Index among the non-empty lines.
    pub position: usize,
    pub text: String,
    #[serde(flatten)]
    pub class: LineClass,
}

/// Split OCR text into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    })
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect()
}

/// Recognizes label lines by exact normalized alias match.
#[derive(Debug, Clone)]
pub struct LabelRule {
    aliases: AliasTable,
    separator: SeparatorPolicy,
}

impl LabelRule {
    pub fn new(aliases: AliasTable, separator: SeparatorPolicy) -> Self {
        Self { aliases, separator }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn separator(&self) -> SeparatorPolicy {
        self.separator
    }
}

impl LineRule for LabelRule {
    type Output = CanonicalField;

    fn matches(&self, line: &str) -> Option<CanonicalField> {
        if self.separator == SeparatorPolicy::Required && !line.ends_with(LABEL_SEPARATORS) {
            return None;
        }
        self.aliases.lookup(line)
    }
}

/// Recognizes value lines with an anchored pattern.
#[derive(Debug, Clone)]
pub struct ValueRule {
    pattern: Regex,
}

impl ValueRule {
    /// Rule using the built-in value pattern.
    pub fn new() -> Self {
        Self {
            pattern: VALUE_LINE.clone(),
        }
    }

    /// Rule using a caller pattern. The pattern always has to match the whole line.
    pub fn with_pattern(pattern: &str) -> Result<Self, ExtractionError> {
        let anchored = format!("^(?:{})$", pattern);
        let pattern = Regex::new(&anchored).map_err(|e| ExtractionError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for ValueRule {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRule for ValueRule {
    type Output = ();

    fn matches(&self, line: &str) -> Option<()> {
        self.pattern.is_match(line).then_some(())
    }
}

/// Assigns every line exactly one [`LineClass`]. Labels win over values.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    label: LabelRule,
    value: ValueRule,
}

impl LineClassifier {
    pub fn new(label: LabelRule, value: ValueRule) -> Self {
        Self { label, value }
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.label = LabelRule::new(aliases, self.label.separator);
        self
    }

    pub fn with_separator_policy(mut self, separator: SeparatorPolicy) -> Self {
        self.label.separator = separator;
        self
    }

    pub fn with_value_rule(mut self, value: ValueRule) -> Self {
        self.value = value;
        self
    }

    pub fn aliases(&self) -> &AliasTable {
        self.label.aliases()
    }

    pub fn separator(&self) -> SeparatorPolicy {
        self.label.separator()
    }

    pub fn value_rule(&self) -> &ValueRule {
        &self.value
    }

    /// Classify one trimmed line.
    pub fn classify(&self, line: &str) -> LineClass {
        if let Some(field) = self.label.matches(line) {
            LineClass::Label(field)
        } else if self.value.matches(line).is_some() {
            LineClass::Value
        } else {
            LineClass::Other
        }
    }

    /// Split and classify a whole transcript.
    pub fn classify_text(&self, text: &str) -> Vec<ClassifiedLine> {
        split_lines(text)
            .into_iter()
            .enumerate()
            .map(|(position, line)| ClassifiedLine {
                position,
                text: line.to_string(),
                class: self.classify(line),
            })
            .collect()
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(
            LabelRule::new(AliasTable::default(), SeparatorPolicy::default()),
            ValueRule::new(),
        )
    }
}
