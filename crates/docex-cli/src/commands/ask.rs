//! Ask command - answer a question about a document.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use super::{build_processor, load_config, read_document_text};

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Question to answer from the document text
    #[arg(required = true)]
    question: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: AskArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = read_document_text(&args.input, &config)?;
    if text.trim().is_empty() {
        anyhow::bail!("Could not extract text from PDF");
    }

    info!("Answering question about {}", args.input.display());

    let question = args.question.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        build_processor(&config).answer_question(&text, &question)
    })
    .await?;

    let json = outcome.to_json();
    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", json);
    }

    Ok(())
}
