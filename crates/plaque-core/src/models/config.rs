//! Configuration structures for nameplate extraction.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::field::CanonicalField;
use crate::error::{PlaqueError, Result};
use crate::nameplate::rules::SeparatorPolicy;
use crate::nameplate::DEFAULT_SENTINEL;

/// Main configuration for the plaque pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaqueConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Row export configuration.
    pub export: ExportConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fields to report, in output order.
    pub target_fields: Vec<CanonicalField>,

    /// Text reported for fields that were not detected.
    pub sentinel: String,

    /// Whether label lines must end with a separator such as ':'.
    pub separator: SeparatorPolicy,

    /// Start from the built-in alias table.
    pub builtin_aliases: bool,

    /// Aliases added on top of the built-in table (alias -> field).
    pub extra_aliases: BTreeMap<String, CanonicalField>,

    /// Replacement for the built-in value line pattern.
    pub value_pattern: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            target_fields: CanonicalField::ALL.to_vec(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            separator: SeparatorPolicy::Optional,
            builtin_aliases: true,
            extra_aliases: BTreeMap::new(),
            value_pattern: None,
        }
    }
}

/// CSV row export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Header of the leading panel identifier column.
    pub id_column: String,

    /// Write a header row when creating a new file.
    pub write_header: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            id_column: "panel_id".to_string(),
            write_header: true,
        }
    }
}

impl PlaqueConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PlaqueError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PlaqueConfig =
            serde_json::from_str(r#"{"extraction": {"sentinel": "n/a"}}"#).unwrap();

        assert_eq!(config.extraction.sentinel, "n/a");
        assert_eq!(config.extraction.target_fields, CanonicalField::ALL.to_vec());
        assert_eq!(config.extraction.separator, SeparatorPolicy::Optional);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_extra_aliases_deserialize() {
        let config: ExtractionConfig = serde_json::from_str(
            r#"{"extra_aliases": {"v0c": "Voc"}, "separator": "required"}"#,
        )
        .unwrap();

        assert_eq!(config.extra_aliases.get("v0c"), Some(&CanonicalField::Voc));
        assert_eq!(config.separator, SeparatorPolicy::Required);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PlaqueConfig::default();
        config.extraction.target_fields = vec![CanonicalField::Pmax];
        config.export.id_column = "id_panneau".to_string();
        config.save(&path).unwrap();

        assert_eq!(PlaqueConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            PlaqueConfig::from_file(&path),
            Err(PlaqueError::Config(_))
        ));
    }
}
