//! Aliases command - inspect label recognition.

use clap::{Args, Subcommand};
use console::style;

use plaque_core::nameplate::rules::normalize_key;
use plaque_core::{CanonicalField, LineClass, PositionalExtractor};

use super::{build_extractor, load_config, ExtractionOverrides};

/// Arguments for the aliases command.
#[derive(Args)]
pub struct AliasesArgs {
    #[command(subcommand)]
    command: AliasesCommand,
}

#[derive(Subcommand)]
enum AliasesCommand {
    /// List the effective alias table
    List {
        #[command(flatten)]
        overrides: ExtractionOverrides,
    },

    /// Show how transcript lines are classified
    Check {
        /// Lines to classify
        #[arg(required = true)]
        lines: Vec<String>,

        #[command(flatten)]
        overrides: ExtractionOverrides,
    },
}

pub fn run(args: AliasesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        AliasesCommand::List { overrides } => {
            let extractor = build_extractor(&config, &overrides)?;
            list_aliases(&extractor);
        }
        AliasesCommand::Check { lines, overrides } => {
            let extractor = build_extractor(&config, &overrides)?;
            for line in &lines {
                println!("{}", describe_line(&extractor, line));
            }
        }
    }

    Ok(())
}

fn list_aliases(extractor: &PositionalExtractor) {
    let classifier = extractor.classifier();

    for field in CanonicalField::ALL {
        let aliases = classifier.aliases().aliases_for(field);
        let aliases = if aliases.is_empty() {
            style("(none)".to_string()).dim()
        } else {
            style(aliases.join(", "))
        };
        println!(
            "{:<5} {:<22} {}",
            style(field.as_str()).bold(),
            field.description(),
            aliases
        );
    }

    println!();
    println!("Separator: {:?}", classifier.separator());
    println!("Value pattern: {}", classifier.value_rule().as_str());
}

fn describe_line(extractor: &PositionalExtractor, line: &str) -> String {
    let trimmed = line.trim();
    let class = match extractor.classifier().classify(trimmed) {
        LineClass::Label(field) => format!("label {}", field),
        LineClass::Value => "value".to_string(),
        LineClass::Other => "other".to_string(),
    };

    format!(
        "{:<24} key={:<10} {}",
        format!("{:?}", trimmed),
        normalize_key(trimmed),
        class
    )
}
