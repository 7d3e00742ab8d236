//! Batch command - extract fields from many transcripts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use plaque_core::{CanonicalField, ExtractionResult, FieldExtractor, PositionalExtractor};

use super::{build_extractor, load_config, ExtractionOverrides};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of transcript files (e.g. "scans/*.txt")
    #[arg(required = true)]
    input: String,

    /// Directory for one JSON result per transcript
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write a summary CSV with one row per transcript
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Number of transcripts processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    overrides: ExtractionOverrides,
}

/// Outcome of processing a single transcript.
struct FileOutcome {
    path: PathBuf,
    /// Path relative to the glob root, used to name outputs.
    name: PathBuf,
    result: Result<ExtractionResult, String>,
    extracted_at: DateTime<Local>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let extractor = Arc::new(build_extractor(&config, &args.overrides)?);
    let root = glob_root(&args.input);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching transcripts found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} transcripts to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let name = relative_name(&path, &root);
        let semaphore = semaphore.clone();
        let extractor = extractor.clone();
        let pb = pb.clone();

        handles.push(tokio::spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => process_file(&path, extractor).await,
                Err(e) => Err(e.to_string()),
            };
            pb.inc(1);
            FileOutcome {
                path,
                name,
                result,
                extracted_at: Local::now(),
            }
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = handle.await?;

        if let Err(e) = &outcome.result {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", outcome.path.display(), e);
            } else {
                error!("Failed to process {}: {}", outcome.path.display(), e);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", outcome.path.display(), e);
            }
        }

        outcomes.push(outcome);
    }

    pb.finish_and_clear();

    if let Some(ref output_dir) = args.output_dir {
        for outcome in &outcomes {
            if let Ok(result) = &outcome.result {
                let output_path = output_dir.join(&outcome.name).with_extension("json");
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output_path, serde_json::to_string_pretty(result)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if let Some(ref summary_path) = args.summary {
        write_summary(summary_path, extractor.target_fields(), &outcomes)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();
    let complete = outcomes
        .iter()
        .filter(|o| o.result.as_ref().is_ok_and(|r| r.is_complete()))
        .count();

    eprintln!();
    eprintln!(
        "{} Processed {} transcripts in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} complete, {} partial, {} failed",
        style(complete).green(),
        style(outcomes.len() - complete - failed.len()).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for outcome in &failed {
            eprintln!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.result.as_ref().err().map(String::as_str).unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_file(
    path: &Path,
    extractor: Arc<PositionalExtractor>,
) -> Result<ExtractionResult, String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;

    let result = tokio::task::spawn_blocking(move || extractor.extract(&text))
        .await
        .map_err(|e| e.to_string())?;

    debug!(
        "{}: {} of {} fields detected",
        path.display(),
        result.len() - result.missing_fields().len(),
        result.len()
    );

    Ok(result)
}

/// Leading directories of a glob pattern that contain no wildcard.
fn glob_root(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(['*', '?', '[']))
        .collect()
}

/// Name a matched file by its path under the glob root, so equal file
/// names in different directories stay apart.
fn relative_name(path: &Path, root: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf()),
    }
}

fn write_summary(
    path: &Path,
    fields: &[CanonicalField],
    outcomes: &[FileOutcome],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["file".to_string(), "status".to_string()];
    header.extend(fields.iter().map(|f| f.to_string()));
    header.extend(["missing", "extracted_at", "error"].map(String::from));
    wtr.write_record(&header)?;

    for outcome in outcomes {
        let filename = outcome.name.display().to_string();
        let extracted_at = outcome.extracted_at.to_rfc3339();

        let record: Vec<String> = match &outcome.result {
            Ok(result) => {
                let status = if result.is_complete() { "complete" } else { "partial" };
                let mut record = vec![filename, status.to_string()];
                record.extend(result.to_row());
                record.push(result.missing_fields().len().to_string());
                record.push(extracted_at);
                record.push(String::new());
                record
            }
            Err(e) => {
                let mut record = vec![filename, "error".to_string()];
                record.extend(fields.iter().map(|_| String::new()));
                record.push(String::new());
                record.push(extracted_at);
                record.push(e.clone());
                record
            }
        };
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_root() {
        assert_eq!(glob_root("scans/**/*.txt"), PathBuf::from("scans"));
        assert_eq!(glob_root("/data/scans/2024-*/p?.txt"), PathBuf::from("/data/scans"));
        assert_eq!(glob_root("*.txt"), PathBuf::new());
    }

    #[test]
    fn test_relative_name_keeps_subdirectories() {
        let root = glob_root("scans/**/*.txt");

        assert_eq!(
            relative_name(Path::new("scans/a/x.txt"), &root),
            PathBuf::from("a/x.txt")
        );
        assert_ne!(
            relative_name(Path::new("scans/a/x.txt"), &root),
            relative_name(Path::new("scans/b/x.txt"), &root)
        );
        assert_eq!(
            relative_name(Path::new("x.txt"), &glob_root("*.txt")),
            PathBuf::from("x.txt")
        );
    }

    #[test]
    fn test_relative_name_for_literal_path() {
        let root = glob_root("scans/x.txt");
        assert_eq!(
            relative_name(Path::new("scans/x.txt"), &root),
            PathBuf::from("x.txt")
        );
    }
}
