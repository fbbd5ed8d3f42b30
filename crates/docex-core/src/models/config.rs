//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the instruction model path.
pub const LLM_MODEL_PATH_ENV: &str = "MISTRAL_MODEL_PATH";

/// Main configuration for docex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocexConfig {
    /// Document processing configuration.
    pub extraction: ExtractionConfig,

    /// Model artifact configuration.
    pub models: ModelConfig,

    /// PDF text layer configuration.
    pub pdf: PdfConfig,
}

/// Windows and limits used by the document processors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters of text handed to the entity tagger.
    pub entity_window: usize,

    /// Characters of text handed to the summarizer.
    pub summary_window: usize,

    /// Minimum summary length, in words.
    pub summary_min_length: usize,

    /// Maximum summary length, in words.
    pub summary_max_length: usize,

    /// Characters per chunk for instruction-driven extraction.
    pub chunk_size: usize,

    /// Maximum characters kept from a user instruction.
    pub max_prompt_length: usize,

    /// Token budget for each generated chunk response.
    pub max_generated_tokens: usize,

    /// Stop sequence passed to the instruction model.
    pub stop_sequence: String,

    /// Separator appended after each chunk response.
    pub chunk_separator: String,

    /// Upper bound on a single model generation call, in seconds.
    pub generation_timeout_secs: Option<u64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            entity_window: 512,
            summary_window: 1024,
            summary_min_length: 50,
            summary_max_length: 150,
            chunk_size: 3000,
            max_prompt_length: 500,
            max_generated_tokens: 1024,
            stop_sequence: "</s>".to_string(),
            chunk_separator: "\n---\n".to_string(),
            generation_timeout_secs: None,
        }
    }
}

/// Model file paths and runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing ONNX models and tokenizers.
    pub model_dir: PathBuf,

    /// Token classification model file name.
    pub tagger_model: Option<String>,

    /// Tokenizer for the tagging model.
    pub tagger_tokenizer: String,

    /// JSON file with the tagger's `id2label` mapping.
    pub tagger_labels: String,

    /// Extractive question answering model file name.
    pub qa_model: Option<String>,

    /// Tokenizer for the QA model.
    pub qa_tokenizer: String,

    /// Path to the local instruction model artifact (GGUF).
    pub llm_model: PathBuf,

    /// Base URL of the local inference server hosting the instruction model.
    pub llm_endpoint: String,

    /// Summarize research papers with the instruction model.
    pub enable_summarization: bool,

    /// Threads used by ONNX sessions.
    pub num_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            tagger_model: Some("ner/model.onnx".to_string()),
            tagger_tokenizer: "ner/tokenizer.json".to_string(),
            tagger_labels: "ner/labels.json".to_string(),
            qa_model: Some("qa/model.onnx".to_string()),
            qa_tokenizer: "qa/tokenizer.json".to_string(),
            llm_model: PathBuf::from("models/mistral/mistral-7b-instruct-v0.1.Q4_K_M.gguf"),
            llm_endpoint: "http://127.0.0.1:8080".to_string(),
            enable_summarization: false,
            num_threads: 4,
        }
    }
}

impl ModelConfig {
    /// Full path of a file inside the model directory.
    pub fn model_path(&self, name: &str) -> PathBuf {
        self.model_dir.join(name)
    }

    /// Instruction model path, honouring the environment override.
    pub fn llm_model_path(&self) -> PathBuf {
        std::env::var_os(LLM_MODEL_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.llm_model.clone())
    }
}

/// PDF text layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { max_pages: 0 }
    }
}

impl DocexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_processing_limits() {
        let config = ExtractionConfig::default();
        assert_eq!(config.entity_window, 512);
        assert_eq!(config.summary_window, 1024);
        assert_eq!(config.chunk_size, 3000);
        assert_eq!(config.max_prompt_length, 500);
        assert_eq!(config.max_generated_tokens, 1024);
        assert_eq!(config.stop_sequence, "</s>");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "extraction": { "chunk_size": 1000 } }"#).unwrap();

        let config = DocexConfig::from_file(&path).unwrap();
        assert_eq!(config.extraction.chunk_size, 1000);
        assert_eq!(config.extraction.entity_window, 512);
        assert_eq!(config.models.num_threads, 4);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DocexConfig::default();
        config.extraction.generation_timeout_secs = Some(30);
        config.save(&path).unwrap();

        let loaded = DocexConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.generation_timeout_secs, Some(30));
    }
}
