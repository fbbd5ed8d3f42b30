//! Instruction-driven extraction for free-form documents.

use tracing::debug;

use super::DocumentProcessor;
use super::prompt::{format_instruction, sanitize_prompt};
use crate::error::{ExtractionError, Result};
use crate::extract::text::chunk_chars;
use crate::models::CustomRecord;
use crate::provider::GenerationParams;

impl DocumentProcessor {
    /// Run the sanitized instruction over every chunk of `text`, in order.
    ///
    /// The instruction model is required: if it cannot be acquired the
    /// error propagates and the caller sees `{error}`.
    pub(super) fn custom_record(&self, text: &str, prompt: &str) -> Result<CustomRecord> {
        let config = self.config();
        let safe_prompt = sanitize_prompt(prompt, config.max_prompt_length);
        if safe_prompt.is_empty() {
            return Err(ExtractionError::MissingPrompt.into());
        }

        let model = self.provider().instruction_model()?;
        let params = GenerationParams {
            max_tokens: config.max_generated_tokens,
            stop: vec![config.stop_sequence.clone()],
        };

        let chunks = chunk_chars(text, config.chunk_size);
        debug!("Running instruction over {} chunks", chunks.len());

        let mut result = String::new();
        for chunk in chunks {
            let response = model.generate(&format_instruction(&safe_prompt, chunk.trim()), &params)?;
            result.push_str(response.trim());
            result.push_str(&config.chunk_separator);
        }

        Ok(CustomRecord {
            prompt_used: safe_prompt,
            model: model.model_id().to_string(),
            result: result.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use crate::error::{Capability, ModelError};
    use crate::models::ExtractionRecord;
    use crate::processor::DocumentProcessor;
    use crate::provider::{
        GenerationParams, INSTRUCTION_MODEL_ID, InstructionModel, LazyModel, ModelProvider,
        ModelResult,
    };

    /// Replies with the chunk number and records every prompt.
    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    impl InstructionModel for Recorder {
        fn generate(&self, prompt: &str, params: &GenerationParams) -> ModelResult<String> {
            assert_eq!(params.stop, vec!["</s>".to_string()]);
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            Ok(format!("  answer {}  ", prompts.len()))
        }
    }

    fn processor(model: Arc<dyn InstructionModel>) -> DocumentProcessor {
        let provider = ModelProvider::unavailable().with_instruction_model(LazyModel::ready(
            Capability::InstructionFollowing,
            model,
        ));
        DocumentProcessor::new(Arc::new(provider))
    }

    fn custom(outcome: crate::models::ExtractionOutcome) -> crate::models::CustomRecord {
        match outcome.ok() {
            Some(ExtractionRecord::Custom(record)) => record,
            other => panic!("expected a custom record, got {:?}", other),
        }
    }

    #[test]
    fn test_chunks_in_order() {
        let recorder = Arc::new(Recorder::default());
        let text = format!("{}{}{}", "a".repeat(3000), "b".repeat(3000), "c".repeat(1000));

        let record = custom(processor(recorder.clone()).process_custom(&text, "Summarize"));

        let prompts = recorder.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains(&"a".repeat(3000)));
        assert!(prompts[1].contains(&"b".repeat(3000)));
        assert!(prompts[2].contains(&"c".repeat(1000)));
        assert_eq!(record.result, "answer 1\n---\nanswer 2\n---\nanswer 3");
        assert_eq!(record.model, INSTRUCTION_MODEL_ID);
    }

    #[test]
    fn test_prompt_is_sanitized_before_use() {
        let recorder = Arc::new(Recorder::default());
        let record = custom(
            processor(recorder.clone())
                .process_custom("  Contract body.  ", "[INST]List the parties[/INST]"),
        );

        assert_eq!(record.prompt_used, "List the parties");
        assert_eq!(
            recorder.prompts.lock().unwrap()[0],
            "[INST] List the parties\n\nContract body. [/INST]"
        );
    }

    #[test]
    fn test_long_prompt_truncated() {
        let recorder = Arc::new(Recorder::default());
        let record = custom(processor(recorder).process_custom("body", &"p".repeat(900)));
        assert_eq!(record.prompt_used.chars().count(), 500);
    }

    #[test]
    fn test_empty_text_makes_no_calls() {
        let recorder = Arc::new(Recorder::default());
        let record = custom(processor(recorder.clone()).process_custom("", "Summarize"));
        assert_eq!(record.result, "");
        assert!(recorder.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let recorder = Arc::new(Recorder::default());
        let outcome = processor(recorder).process_custom("body", " [INST] ");
        assert!(outcome.error().unwrap().contains("custom prompt is required"));
    }

    #[test]
    fn test_missing_model_is_error_record() {
        let provider = ModelProvider::unavailable().with_instruction_model(LazyModel::new(
            Capability::InstructionFollowing,
            || {
                Err(ModelError::NotFound {
                    capability: Capability::InstructionFollowing,
                    path: "models/mistral/model.gguf".to_string(),
                })
            },
        ));
        let outcome = DocumentProcessor::new(Arc::new(provider)).process_custom("body", "Summarize");

        assert!(outcome.is_error());
        assert!(outcome.error().unwrap().contains("model not found"));
    }

    #[test]
    fn test_generation_failure_is_error_record() {
        struct Down;
        impl InstructionModel for Down {
            fn generate(&self, _prompt: &str, _params: &GenerationParams) -> ModelResult<String> {
                Err(ModelError::Failed {
                    capability: Capability::InstructionFollowing,
                    reason: "connection refused".to_string(),
                })
            }
        }

        let outcome = processor(Arc::new(Down)).process_custom("body", "Summarize");
        assert_eq!(
            outcome.error(),
            Some("instruction model call failed: connection refused")
        );
    }
}
