//! Batch processing command for multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use docex_core::models::DocexConfig;
use docex_core::{DocumentProcessor, DocumentType};

use super::process::ProcessingReport;
use super::{build_processor, is_supported, load_config, read_document_text};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Document type applied to every file
    #[arg(short = 't', long, default_value = "invoice")]
    document_type: DocumentType,

    /// Instruction for documents of type "other"
    #[arg(short, long)]
    prompt: Option<String>,

    /// Output directory for per-file JSON results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    report: Option<ProcessingReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl FileResult {
    fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // One processor for the whole batch so each model loads at most once.
    let document_type = args.document_type;
    let prompt = args.prompt.clone();
    let continue_on_error = args.continue_on_error;
    let pb = overall_pb.clone();
    let results = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<FileResult>> {
        let processor = build_processor(&config);
        let mut results = Vec::with_capacity(files.len());

        for path in files {
            let result = process_file(&path, &processor, &config, document_type, prompt.as_deref());
            pb.inc(1);

            if let Some(message) = &result.error {
                if continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), message);
                } else {
                    error!("Failed to process {}: {}", path.display(), message);
                    anyhow::bail!("Processing failed: {}", message);
                }
            }
            results.push(result);
        }
        Ok(results)
    })
    .await??;

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(report) = &result.report {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                let output_path = output_dir.join(format!("{}.json", output_name));
                fs::write(&output_path, serde_json::to_string_pretty(report)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, document_type, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| !r.succeeded()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_file(
    path: &Path,
    processor: &DocumentProcessor,
    config: &DocexConfig,
    document_type: DocumentType,
    prompt: Option<&str>,
) -> FileResult {
    let file_start = Instant::now();

    let text = match read_document_text(path, config) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            return FileResult {
                path: path.to_path_buf(),
                report: None,
                error: Some("Could not extract text from PDF".to_string()),
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            };
        }
        Err(e) => {
            return FileResult {
                path: path.to_path_buf(),
                report: None,
                error: Some(e.to_string()),
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            };
        }
    };

    let outcome = processor.process(&text, document_type, prompt);
    let elapsed = file_start.elapsed();

    FileResult {
        path: path.to_path_buf(),
        error: outcome.error().map(str::to_string),
        report: Some(ProcessingReport::new(document_type, &outcome, elapsed)),
        processing_time_ms: elapsed.as_millis() as u64,
    }
}

fn write_summary(
    path: &Path,
    document_type: DocumentType,
    results: &[FileResult],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "document_type",
        "success",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        wtr.write_record([
            filename,
            document_type.as_str(),
            if result.succeeded() { "true" } else { "false" },
            &result.processing_time_ms.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
