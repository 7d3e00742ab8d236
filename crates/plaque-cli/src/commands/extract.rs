//! Extract command - recover fields from a single OCR transcript.

use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use plaque_core::{ExportConfig, ExtractionReport, ExtractionResult, FieldExtractor};

use super::{build_extractor, load_config, ExtractionOverrides};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Transcript file, or "-" to read stdin
    #[arg(default_value = "-")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Panel identifier written as the first CSV column
    #[arg(long)]
    panel_id: Option<String>,

    /// Append a CSV row to the output file instead of overwriting it.
    /// Rows are always CSV and must match the sheet's existing columns.
    #[arg(long, requires = "output", conflicts_with = "format")]
    append: bool,

    /// Exit with an error when any field is not detected
    #[arg(long)]
    fail_on_missing: bool,

    #[command(flatten)]
    overrides: ExtractionOverrides,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON object of field values
    Json,
    /// JSON body with null for undetected fields
    Api,
    /// CSV header and row
    Csv,
    /// Plain text summary
    Text,
    /// JSON with line classification diagnostics
    Report,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let extractor = build_extractor(&config, &args.overrides)?;

    let text = read_input(&args.input)?;
    info!("Extracting fields from {} characters of text", text.len());

    let report = extractor.extract_with_report(&text);
    let missing = report.result.missing_fields();

    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
        eprintln!(
            "{} Fields not detected: {}",
            style("⚠").yellow(),
            names.join(", ")
        );
    }

    match &args.output {
        Some(output_path) if args.append => {
            append_row(
                output_path,
                &report.result,
                args.panel_id.as_deref(),
                &config.export,
            )?;
            eprintln!(
                "{} Row appended to {}",
                style("✓").green(),
                output_path.display()
            );
        }
        Some(output_path) => {
            let output = format_report(&report, args.format, args.panel_id.as_deref(), &config.export)?;
            fs::write(output_path, &output)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                output_path.display()
            );
        }
        None => {
            let output = format_report(&report, args.format, args.panel_id.as_deref(), &config.export)?;
            println!("{}", output.trim_end());
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if args.fail_on_missing && !missing.is_empty() {
        anyhow::bail!("{} of {} fields not detected", missing.len(), report.result.len());
    }

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = Path::new(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(path)?)
}

pub fn format_report(
    report: &ExtractionReport,
    format: OutputFormat,
    panel_id: Option<&str>,
    export: &ExportConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.result)?),
        OutputFormat::Api => Ok(serde_json::to_string_pretty(&report.result.api_response())?),
        OutputFormat::Csv => format_csv(&report.result, panel_id, export),
        OutputFormat::Text => Ok(format_text(&report.result)),
        OutputFormat::Report => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn csv_header(result: &ExtractionResult, panel_id: Option<&str>, export: &ExportConfig) -> Vec<String> {
    let mut header = Vec::with_capacity(result.len() + 1);
    if panel_id.is_some() {
        header.push(export.id_column.clone());
    }
    header.extend(result.iter().map(|(field, _)| field.to_string()));
    header
}

fn csv_row(result: &ExtractionResult, panel_id: Option<&str>) -> Vec<String> {
    let mut row = Vec::with_capacity(result.len() + 1);
    if let Some(id) = panel_id {
        row.push(id.to_string());
    }
    row.extend(result.to_row());
    row
}

fn format_csv(
    result: &ExtractionResult,
    panel_id: Option<&str>,
    export: &ExportConfig,
) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if export.write_header {
        wtr.write_record(csv_header(result, panel_id, export))?;
    }
    wtr.write_record(csv_row(result, panel_id))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Append one row to a CSV sheet, writing the header only for a new sheet.
///
/// An existing sheet must have the same columns as the new row.
fn append_row(
    path: &Path,
    result: &ExtractionResult,
    panel_id: Option<&str>,
    export: &ExportConfig,
) -> anyhow::Result<()> {
    let header = csv_header(result, panel_id, export);
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    if !is_new {
        check_sheet_columns(path, &header, export)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    if is_new && export.write_header {
        wtr.write_record(&header)?;
    }
    wtr.write_record(csv_row(result, panel_id))?;
    wtr.flush()?;

    debug!("Appended row to {}", path.display());
    Ok(())
}

/// Compare the first record of an existing sheet with the row about to be appended.
fn check_sheet_columns(path: &Path, header: &[String], export: &ExportConfig) -> anyhow::Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let Some(first) = rdr.records().next().transpose()? else {
        return Ok(());
    };

    if export.write_header {
        if !first.iter().eq(header.iter().map(String::as_str)) {
            anyhow::bail!(
                "Sheet {} has columns [{}] but this row has [{}]",
                path.display(),
                first.iter().collect::<Vec<_>>().join(", "),
                header.join(", ")
            );
        }
    } else if first.len() != header.len() {
        anyhow::bail!(
            "Sheet {} has {} columns but this row has {}",
            path.display(),
            first.len(),
            header.len()
        );
    }

    Ok(())
}

pub fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    for ((field, text), (_, value)) in result.iter().zip(result.entries()) {
        let unit = if matches!(value, plaque_core::FieldValue::Numeric(_)) {
            field.unit()
        } else {
            ""
        };
        output.push_str(&format!(
            "{:<5} {:<22} {} {}\n",
            field.as_str(),
            field.description(),
            text,
            unit
        ));
    }

    output
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaque_core::PositionalExtractor;

    fn sample() -> ExtractionReport {
        PositionalExtractor::new().extract_with_report("Voc:\nIsc:\n45.6 V\n9.1 A\n")
    }

    #[test]
    fn test_format_csv_with_panel_id() {
        let report = sample();
        let csv = format_csv(&report.result, Some("P-17"), &ExportConfig::default()).unwrap();

        assert_eq!(
            csv,
            "panel_id,Voc,Isc,Pmax,Vpm,Ipm\nP-17,45.6,9.1,Non détecté,Non détecté,Non détecté\n"
        );
    }

    #[test]
    fn test_format_csv_without_header() {
        let export = ExportConfig {
            write_header: false,
            ..ExportConfig::default()
        };
        let csv = format_csv(&sample().result, None, &export).unwrap();
        assert_eq!(csv, "45.6,9.1,Non détecté,Non détecté,Non détecté\n");
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&sample().result);
        let first = text.lines().next().unwrap();

        assert!(first.starts_with("Voc"));
        assert!(first.ends_with("45.6 V"));
        assert!(text.lines().last().unwrap().ends_with("Non détecté"));
    }

    #[test]
    fn test_append_row_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let report = sample();
        let export = ExportConfig::default();

        append_row(&path, &report.result, Some("A"), &export).unwrap();
        append_row(&path, &report.result, Some("B"), &export).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("panel_id,Voc"));
        assert!(lines[1].starts_with("A,45.6"));
        assert!(lines[2].starts_with("B,45.6"));
    }

    #[test]
    fn test_append_row_rejects_other_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let report = sample();
        let export = ExportConfig::default();

        append_row(&path, &report.result, Some("A"), &export).unwrap();

        let without_id = append_row(&path, &report.result, None, &export);
        assert!(without_id.unwrap_err().to_string().contains("has columns"));

        let fewer_fields = PositionalExtractor::new()
            .with_target_fields(vec![plaque_core::CanonicalField::Voc])
            .extract("Voc\n45.6 V\n");
        assert!(append_row(&path, &fewer_fields, Some("B"), &export).is_err());

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_append_row_without_header_checks_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let report = sample();
        let export = ExportConfig {
            write_header: false,
            ..ExportConfig::default()
        };

        append_row(&path, &report.result, Some("A"), &export).unwrap();
        append_row(&path, &report.result, Some("B"), &export).unwrap();
        assert!(append_row(&path, &report.result, None, &export).is_err());
    }
}
