//! Positional label/value extractor.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::extraction::{ExtractionReport, ExtractionResult, FieldValue, Pairing};
use crate::models::field::CanonicalField;

use super::rules::{
    normalize_value, AliasTable, LineClass, LineClassifier, SeparatorPolicy, ValueRule,
};
use super::FieldExtractor;

/// Text reported for fields that were not detected.
pub const DEFAULT_SENTINEL: &str = "Non détecté";

/// Extract `target_fields` from `raw_text` with the built-in rules.
///
/// Every requested field appears in the result, in the requested order.
/// `aliases` must not be empty.
pub fn extract(
    raw_text: &str,
    target_fields: &[CanonicalField],
    aliases: &AliasTable,
) -> ExtractionResult {
    debug_assert!(!aliases.is_empty(), "alias table must not be empty");

    PositionalExtractor::new()
        .with_aliases(aliases.clone())
        .with_target_fields(target_fields.to_vec())
        .extract(raw_text)
}

/// Pairs label lines with value lines by order of appearance.
///
/// The i-th label takes the i-th value; labels or values beyond the shorter
/// list stay unpaired. When a field is labelled twice, its first label keeps
/// the value and the later one still consumes a value slot.
#[derive(Debug, Clone)]
pub struct PositionalExtractor {
    classifier: LineClassifier,
    target_fields: Vec<CanonicalField>,
    sentinel: String,
}

impl PositionalExtractor {
    /// Create an extractor with the built-in aliases reporting all fields.
    pub fn new() -> Self {
        Self {
            classifier: LineClassifier::default(),
            target_fields: CanonicalField::ALL.to_vec(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    /// Build an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let mut aliases = if config.builtin_aliases {
            AliasTable::builtin()
        } else {
            AliasTable::new()
        };
        aliases.extend(
            config
                .extra_aliases
                .iter()
                .map(|(alias, field)| (alias.as_str(), *field)),
        )?;

        if aliases.is_empty() {
            return Err(ExtractionError::EmptyAliasTable);
        }

        let mut extractor = Self::new()
            .with_aliases(aliases)
            .with_target_fields(config.target_fields.clone())
            .with_sentinel(config.sentinel.clone())
            .with_separator_policy(config.separator);

        if let Some(pattern) = &config.value_pattern {
            extractor = extractor.with_value_pattern(pattern)?;
        }

        Ok(extractor)
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.classifier = self.classifier.with_aliases(aliases);
        self
    }

    /// Set the reported fields and their order.
    pub fn with_target_fields(mut self, fields: Vec<CanonicalField>) -> Self {
        self.target_fields = fields;
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_separator_policy(mut self, separator: SeparatorPolicy) -> Self {
        self.classifier = self.classifier.with_separator_policy(separator);
        self
    }

    /// Replace the value line pattern.
    pub fn with_value_pattern(mut self, pattern: &str) -> Result<Self, ExtractionError> {
        self.classifier = self.classifier.with_value_rule(ValueRule::with_pattern(pattern)?);
        Ok(self)
    }

    pub fn aliases(&self) -> &AliasTable {
        self.classifier.aliases()
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }
}

impl Default for PositionalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PositionalExtractor {
    fn target_fields(&self) -> &[CanonicalField] {
        &self.target_fields
    }

    fn extract_with_report(&self, text: &str) -> ExtractionReport {
        let lines = self.classifier.classify_text(text);

        let labels: Vec<CanonicalField> = lines
            .iter()
            .filter_map(|line| match line.class {
                LineClass::Label(field) => Some(field),
                _ => None,
            })
            .collect();

        let values: Vec<String> = lines
            .iter()
            .filter(|line| line.class == LineClass::Value)
            .map(|line| line.text.clone())
            .collect();

        let mut paired: HashMap<CanonicalField, FieldValue> = HashMap::new();
        let mut pairings = Vec::with_capacity(labels.len().min(values.len()));

        for (field, raw) in labels.iter().zip(&values) {
            let value = normalize_value(raw);
            let used = !paired.contains_key(field);
            if used {
                paired.insert(*field, value.clone());
            }
            pairings.push(Pairing {
                field: *field,
                raw: raw.clone(),
                value,
                used,
            });
        }

        let entries: Vec<(CanonicalField, FieldValue)> = self
            .target_fields
            .iter()
            .map(|field| {
                let value = paired.get(field).cloned().unwrap_or(FieldValue::NotFound);
                (*field, value)
            })
            .collect();
        let result = ExtractionResult::new(entries, self.sentinel.clone());

        let warnings = collect_warnings(lines.len(), &labels, &values, &pairings, &result);
        for warning in &warnings {
            debug!("{}", warning);
        }

        info!(
            "Extracted {}/{} fields from {} lines ({} labels, {} values)",
            result.len() - result.missing_fields().len(),
            result.len(),
            lines.len(),
            labels.len(),
            values.len()
        );

        ExtractionReport {
            raw_text: text.to_string(),
            lines,
            labels,
            values,
            pairings,
            result,
            warnings,
        }
    }
}

fn collect_warnings(
    line_count: usize,
    labels: &[CanonicalField],
    values: &[String],
    pairings: &[Pairing],
    result: &ExtractionResult,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if labels.is_empty() && line_count > 0 {
        warnings.push(format!("No field labels recognized in {} lines", line_count));
    }

    if labels.len() > values.len() {
        let unpaired: Vec<&str> = labels[values.len()..].iter().map(|f| f.as_str()).collect();
        warnings.push(format!(
            "{} label(s) without a value line: {}",
            unpaired.len(),
            unpaired.join(", ")
        ));
    }

    if values.len() > labels.len() {
        warnings.push(format!(
            "{} value line(s) left unpaired",
            values.len() - labels.len()
        ));
    }

    for pairing in pairings.iter().filter(|p| !p.used) {
        warnings.push(format!(
            "Label {} repeated; value {:?} ignored",
            pairing.field, pairing.raw
        ));
    }

    for field in result.missing_fields() {
        warnings.push(format!("Field {} not detected", field));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::field::CanonicalField::*;

    fn values(result: &ExtractionResult) -> Vec<(CanonicalField, String)> {
        result
            .iter()
            .map(|(field, text)| (field, text.to_string()))
            .collect()
    }

    #[test]
    fn test_nameplate_scenario() {
        let text = "Voc:\nIsc:\n45.6 V\n9.1 A\nPmax:\n415.3 W\n";
        let result = PositionalExtractor::new().extract(text);

        assert_eq!(
            values(&result),
            vec![
                (Voc, "45.6".to_string()),
                (Isc, "9.1".to_string()),
                (Pmax, "415.3".to_string()),
                (Vpm, "Non détecté".to_string()),
                (Ipm, "Non détecté".to_string()),
            ]
        );
    }

    #[test]
    fn test_noise_lines_do_not_shift_pairs() {
        let text = "SOLAR MODULE\nVoc:\n----\nIsc:\nSTC 1000W/m2\n45.6 V\n***\n9.1 A\n";
        let result = PositionalExtractor::new().extract(text);

        assert_eq!(result.value(Voc), Some("45.6"));
        assert_eq!(result.value(Isc), Some("9.1"));
    }

    #[test]
    fn test_excess_labels_get_sentinel() {
        let text = "Voc\nIsc\nPmax\n45.6\n9.1\n";
        let result = PositionalExtractor::new().extract(text);

        assert_eq!(result.value(Voc), Some("45.6"));
        assert_eq!(result.value(Isc), Some("9.1"));
        assert_eq!(result.get(Pmax), Some(&FieldValue::NotFound));
        assert_eq!(result.value(Pmax), Some(DEFAULT_SENTINEL));
    }

    #[test]
    fn test_excess_values_are_dropped() {
        let report = PositionalExtractor::new().extract_with_report("Vpm:\n34.2\n12.1\n99\n");

        assert_eq!(report.result.value(Vpm), Some("34.2"));
        assert_eq!(report.pairings.len(), 1);
        assert!(report.warnings.contains(&"2 value line(s) left unpaired".to_string()));
    }

    #[test]
    fn test_first_duplicate_label_wins() {
        let text = "Voc:\nVoc:\nIsc:\n1\n2\n3\n";
        let report = PositionalExtractor::new().extract_with_report(text);

        assert_eq!(report.labels, vec![Voc, Voc, Isc]);
        assert_eq!(report.result.value(Voc), Some("1.0"));
        assert_eq!(report.result.value(Isc), Some("3.0"));
        assert!(!report.pairings[1].used);
        assert!(report
            .warnings
            .contains(&"Label Voc repeated; value \"2\" ignored".to_string()));
    }

    #[test]
    fn test_alias_variants_are_equivalent() {
        let extractor = PositionalExtractor::new();
        let expected = extractor.extract("Ipm:\n8,93 A");

        for alias in ["ipm", "IPM", "lpm:", "I_pm", "iom", "i pm."] {
            let text = format!("{}\n8,93 A", alias);
            assert_eq!(extractor.extract(&text), expected, "{alias}");
        }
        assert_eq!(expected.value(Ipm), Some("8.9"));
    }

    #[test]
    fn test_empty_text() {
        let report = PositionalExtractor::new().extract_with_report("");

        assert_eq!(report.result.len(), 5);
        assert_eq!(report.result.missing_fields(), CanonicalField::ALL.to_vec());
        assert!(report.lines.is_empty());
    }

    #[test]
    fn test_target_fields_order_and_subset() {
        let text = "Voc:\nIsc:\n45.6 V\n9.1 A\n";
        let result = PositionalExtractor::new()
            .with_target_fields(vec![Isc, Ipm])
            .extract(text);

        assert_eq!(
            values(&result),
            vec![(Isc, "9.1".to_string()), (Ipm, "Non détecté".to_string())]
        );
        assert_eq!(result.get(Voc), None);
    }

    #[test]
    fn test_custom_sentinel() {
        let result = PositionalExtractor::new().with_sentinel("--").extract("noise");
        assert!(result.iter().all(|(_, text)| text == "--"));
    }

    #[test]
    fn test_required_separator_skips_bare_labels() {
        let text = "Voc\nIsc:\n9.1 A\n";
        let extractor =
            PositionalExtractor::new().with_separator_policy(SeparatorPolicy::Required);
        let result = extractor.extract(text);

        assert_eq!(result.value(Isc), Some("9.1"));
        assert_eq!(result.get(Voc), Some(&FieldValue::NotFound));
    }

    #[test]
    fn test_unparseable_value_kept_raw() {
        let extractor = PositionalExtractor::new()
            .with_value_pattern(r"(?i)n/a|[0-9]+[.,]?[0-9]*\s*[a-z]*")
            .unwrap();
        let result = extractor.extract("Voc:\nIsc:\nN/A\n9.1 A\n");

        assert_eq!(result.get(Voc), Some(&FieldValue::Raw("N/A".to_string())));
        assert_eq!(result.value(Isc), Some("9.1"));
    }

    #[test]
    fn test_from_config() {
        let mut config = ExtractionConfig::default();
        config.extra_aliases.insert("Uoc".to_string(), Voc);
        config.target_fields = vec![Voc];
        config.sentinel = "missing".to_string();

        let extractor = PositionalExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.extract("UOC\n49.8 V").value(Voc), Some("49.8"));
        assert_eq!(extractor.extract("").value(Voc), Some("missing"));
    }

    #[test]
    fn test_from_config_rejects_empty_alias_table() {
        let config = ExtractionConfig {
            builtin_aliases: false,
            ..ExtractionConfig::default()
        };

        assert_eq!(
            PositionalExtractor::from_config(&config).unwrap_err(),
            ExtractionError::EmptyAliasTable
        );
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let config = ExtractionConfig {
            value_pattern: Some("[0-9".to_string()),
            ..ExtractionConfig::default()
        };

        assert!(matches!(
            PositionalExtractor::from_config(&config),
            Err(ExtractionError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_free_function_contract() {
        let aliases = AliasTable::default();
        let result = extract("Pmax\n415,3W", &[Pmax, Voc], &aliases);

        assert_eq!(result.len(), 2);
        assert_eq!(result.value(Pmax), Some("415.3"));
        assert_eq!(result.value(Voc), Some(DEFAULT_SENTINEL));
    }
}
