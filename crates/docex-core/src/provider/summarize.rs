//! Summarization on top of an instruction-following model.

use std::sync::Arc;

use super::{GenerationParams, InstructionModel, ModelResult, Summarizer};
use crate::error::{Capability, ModelError};
use crate::processor::prompt::format_instruction;

/// Asks the instruction model for a bounded-length summary.
pub struct InstructionSummarizer {
    model: Arc<dyn InstructionModel>,
    max_tokens: usize,
}

impl InstructionSummarizer {
    pub fn new(model: Arc<dyn InstructionModel>, max_tokens: usize) -> Self {
        Self { model, max_tokens }
    }
}

impl Summarizer for InstructionSummarizer {
    fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> ModelResult<String> {
        let instruction = format!(
            "Summarize the following text in {} to {} words. Reply with the summary only.",
            min_length, max_length
        );
        let params = GenerationParams {
            max_tokens: self.max_tokens,
            stop: vec!["</s>".to_string()],
        };

        let summary = self
            .model
            .generate(&format_instruction(&instruction, text.trim()), &params)
            .map_err(|e| match e {
                ModelError::Failed { reason, .. } => ModelError::Failed {
                    capability: Capability::Summarization,
                    reason,
                },
                other => other,
            })?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(ModelError::InvalidOutput {
                capability: Capability::Summarization,
                reason: "empty summary".to_string(),
            });
        }
        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl InstructionModel for Fixed {
        fn generate(&self, _prompt: &str, _params: &GenerationParams) -> ModelResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_summary_is_trimmed() {
        let summarizer = InstructionSummarizer::new(Arc::new(Fixed("  A short summary.\n")), 64);
        assert_eq!(summarizer.summarize("text", 50, 150).unwrap(), "A short summary.");
    }

    #[test]
    fn test_blank_summary_is_invalid() {
        let summarizer = InstructionSummarizer::new(Arc::new(Fixed("   ")), 64);
        let err = summarizer.summarize("text", 50, 150).unwrap_err();
        assert!(matches!(err, ModelError::InvalidOutput { .. }));
    }
}
