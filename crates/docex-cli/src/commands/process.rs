//! Process command - extract fields from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use docex_core::{DocumentType, ExtractionOutcome};

use super::{build_processor, load_config, read_document_text};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type: invoice, resume, research_paper or other
    #[arg(short = 't', long, default_value = "invoice")]
    document_type: DocumentType,

    /// Instruction for documents of type "other"
    #[arg(short, long)]
    prompt: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Result envelope for one processed document.
#[derive(Debug, Serialize)]
pub struct ProcessingReport {
    pub success: bool,
    pub document_type: DocumentType,
    pub extracted_data: Value,
    /// Seconds spent processing.
    pub processing_time: f64,
    pub message: String,
}

impl ProcessingReport {
    pub fn new(document_type: DocumentType, outcome: &ExtractionOutcome, elapsed: Duration) -> Self {
        let message = match outcome.error() {
            Some(error) => format!("Error processing document: {}", error),
            None => "Document processed successfully".to_string(),
        };
        Self {
            success: !outcome.is_error(),
            document_type,
            extracted_data: outcome.to_json(),
            processing_time: elapsed.as_secs_f64(),
            message,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let text = read_document_text(&args.input, &config)?;
    if text.trim().is_empty() {
        anyhow::bail!("Could not extract text from PDF");
    }
    debug!("Read {} chars of text", text.chars().count());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting {} fields...", args.document_type));

    let document_type = args.document_type;
    let prompt = args.prompt.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let processor = build_processor(&config);
        processor.process(&text, document_type, prompt.as_deref())
    })
    .await?;

    pb.finish_and_clear();

    let report = ProcessingReport::new(document_type, &outcome, start.elapsed());
    let output = match args.format {
        OutputFormat::Json if args.pretty => serde_json::to_string_pretty(&report)?,
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::Text => format_text(&report),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn format_text(report: &ProcessingReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document type: {}\n", report.document_type));
    output.push_str(&format!("Status: {}\n", report.message));
    output.push_str(&format!("Processing time: {:.3}s\n", report.processing_time));
    output.push('\n');

    if let Value::Object(fields) = &report.extracted_data {
        for (key, value) in fields {
            output.push_str(&format!("{}: {}\n", key, format_value(value)));
        }
    }

    output
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => "-".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) if map.len() == 1 => {
                    map.values().next().map(format_value).unwrap_or_default()
                }
                other => format_value(other),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}
