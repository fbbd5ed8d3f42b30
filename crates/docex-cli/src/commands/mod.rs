//! Subcommands and the helpers they share.

pub mod ask;
pub mod batch;
pub mod config;
pub mod models;
pub mod process;

use std::path::Path;
use std::sync::Arc;

use docex_core::models::DocexConfig;
use docex_core::{DocumentProcessor, ModelProvider};

/// Load the config named by `--config`, else the user config file if it
/// exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocexConfig> {
    if let Some(path) = config_path {
        return Ok(DocexConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(DocexConfig::from_file(&default_path)?)
    } else {
        Ok(DocexConfig::default())
    }
}

/// Processor wired to the models named in `config`.
pub fn build_processor(config: &DocexConfig) -> DocumentProcessor {
    DocumentProcessor::new(Arc::new(ModelProvider::from_config(config)))
        .with_config(config.extraction.clone())
}

/// Read the text of a document: the PDF text layer, or the file itself
/// for plain-text inputs.
pub fn read_document_text(path: &Path, config: &DocexConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => Ok(docex_core::pdf::text_from_path(path, config.pdf.max_pages)?),
        "txt" | "text" | "md" => Ok(std::fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Whether `path` has an extension the CLI can read.
pub fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "pdf" | "txt" | "text" | "md")
}
