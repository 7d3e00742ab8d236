//! CLI subcommands and their shared plumbing.

pub mod aliases;
pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use plaque_core::{CanonicalField, ExtractionConfig, PlaqueConfig, PositionalExtractor, SeparatorPolicy};

/// Extraction settings that can be overridden per invocation.
#[derive(Args, Debug, Default)]
pub struct ExtractionOverrides {
    /// Fields to report, comma separated (e.g. "Voc,Isc,Pmax")
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<CanonicalField>>,

    /// Text reported for undetected fields
    #[arg(long)]
    sentinel: Option<String>,

    /// Only accept label lines ending with ':'
    #[arg(long)]
    require_separator: bool,
}

impl ExtractionOverrides {
    fn apply(&self, config: &mut ExtractionConfig) {
        if let Some(fields) = &self.fields {
            config.target_fields = fields.clone();
        }
        if let Some(sentinel) = &self.sentinel {
            config.sentinel = sentinel.clone();
        }
        if self.require_separator {
            config.separator = SeparatorPolicy::Required;
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plaque")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PlaqueConfig> {
    if let Some(path) = config_path {
        debug!("Loading configuration from {}", path);
        return Ok(PlaqueConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        Ok(PlaqueConfig::from_file(&default_path)?)
    } else {
        debug!("No configuration file, using defaults");
        Ok(PlaqueConfig::default())
    }
}

/// Build the extractor from configuration plus command-line overrides.
pub fn build_extractor(
    config: &PlaqueConfig,
    overrides: &ExtractionOverrides,
) -> anyhow::Result<PositionalExtractor> {
    let mut extraction = config.extraction.clone();
    overrides.apply(&mut extraction);
    Ok(PositionalExtractor::from_config(&extraction)?)
}
