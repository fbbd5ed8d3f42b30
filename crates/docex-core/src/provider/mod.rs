//! Model provider: optional NLP capabilities used to enrich records.
//!
//! The provider exposes four independent capabilities: entity tagging,
//! summarization, question answering and instruction following. Each one
//! sits in its own [`LazyModel`] slot, is loaded on first use, and can be
//! missing without affecting the others. Loading is guarded: concurrent
//! first callers wait for a single initialization instead of racing to
//! build duplicate instances. A successful load is kept for the lifetime
//! of the provider and shared read-only; a failed load is reported to the
//! caller and attempted again on the next acquisition.

mod summarize;

#[cfg(feature = "native")]
pub mod llm;
#[cfg(feature = "native")]
pub mod onnx;

pub use summarize::InstructionSummarizer;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::error::{Capability, ModelError};
use crate::models::record::TaggedEntity;

/// Identifier reported for results produced by the local instruction model.
pub const INSTRUCTION_MODEL_ID: &str = "mistral-7b-instruct.Q4_K_M.gguf (local)";

/// Result type for model calls.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Token classification over a short text window.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, text: &str) -> ModelResult<Vec<TaggedEntity>>;
}

/// Abstractive summarization.
pub trait Summarizer: Send + Sync {
    /// Summarize `text` in roughly `min_length..=max_length` words.
    fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> ModelResult<String>;
}

/// Extractive question answering.
pub trait QuestionAnswerer: Send + Sync {
    fn answer(&self, context: &str, question: &str) -> ModelResult<Answer>;
}

/// Free-form generation from an instruction prompt.
pub trait InstructionModel: Send + Sync {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> ModelResult<String>;

    /// Stable identifier of the underlying model artifact.
    fn model_id(&self) -> &str {
        INSTRUCTION_MODEL_ID
    }
}

/// Span picked by a question answering model.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub score: f64,
}

/// Bounds for a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub max_tokens: usize,
    pub stop: Vec<String>,
}

type Loader<T> = Box<dyn Fn() -> ModelResult<Arc<T>> + Send + Sync>;

/// A lazily loaded, shareable model instance.
pub struct LazyModel<T: ?Sized> {
    capability: Capability,
    loader: Option<Loader<T>>,
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> LazyModel<T> {
    /// A slot with no model behind it.
    pub fn unavailable(capability: Capability) -> Self {
        Self {
            capability,
            loader: None,
            cell: OnceCell::new(),
        }
    }

    /// A slot that runs `loader` on first use.
    pub fn new<F>(capability: Capability, loader: F) -> Self
    where
        F: Fn() -> ModelResult<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            capability,
            loader: Some(Box::new(loader)),
            cell: OnceCell::new(),
        }
    }

    /// A slot holding an already constructed model.
    pub fn ready(capability: Capability, model: Arc<T>) -> Self {
        Self {
            capability,
            loader: None,
            cell: OnceCell::with_value(model),
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Whether a model is loaded or can be attempted.
    pub fn is_configured(&self) -> bool {
        self.loader.is_some() || self.cell.get().is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Get the model, loading it on first use.
    pub fn get(&self) -> ModelResult<Arc<T>> {
        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }

        let loader = self.loader.as_ref().ok_or_else(|| ModelError::Unavailable {
            capability: self.capability,
            reason: "not configured".to_string(),
        })?;

        self.cell
            .get_or_try_init(|| {
                let model = loader()?;
                info!("Loaded {} model", self.capability);
                Ok(model)
            })
            .map(Arc::clone)
            .inspect_err(|e| warn!("{} model unavailable: {}", self.capability, e))
    }
}

/// The set of enrichment capabilities available to the processors.
pub struct ModelProvider {
    tagger: Arc<LazyModel<dyn EntityTagger>>,
    summarizer: Arc<LazyModel<dyn Summarizer>>,
    qa: Arc<LazyModel<dyn QuestionAnswerer>>,
    instruction: Arc<LazyModel<dyn InstructionModel>>,
}

impl ModelProvider {
    /// A provider with every capability unavailable. Templated document
    /// types still extract their heuristic fields with it.
    pub fn unavailable() -> Self {
        Self {
            tagger: Arc::new(LazyModel::unavailable(Capability::EntityTagging)),
            summarizer: Arc::new(LazyModel::unavailable(Capability::Summarization)),
            qa: Arc::new(LazyModel::unavailable(Capability::QuestionAnswering)),
            instruction: Arc::new(LazyModel::unavailable(Capability::InstructionFollowing)),
        }
    }

    /// Set the entity tagging slot.
    pub fn with_tagger(mut self, slot: LazyModel<dyn EntityTagger>) -> Self {
        self.tagger = Arc::new(slot);
        self
    }

    /// Set the summarization slot.
    pub fn with_summarizer(mut self, slot: LazyModel<dyn Summarizer>) -> Self {
        self.summarizer = Arc::new(slot);
        self
    }

    /// Set the question answering slot.
    pub fn with_question_answerer(mut self, slot: LazyModel<dyn QuestionAnswerer>) -> Self {
        self.qa = Arc::new(slot);
        self
    }

    /// Set the instruction-following slot.
    pub fn with_instruction_model(mut self, slot: LazyModel<dyn InstructionModel>) -> Self {
        self.instruction = Arc::new(slot);
        self
    }

    /// Summarize through the instruction model, loading it on demand.
    pub fn with_instruction_summarizer(mut self, max_tokens: usize) -> Self {
        let instruction = Arc::clone(&self.instruction);
        self.summarizer = Arc::new(LazyModel::new(Capability::Summarization, move || {
            let model = instruction.get()?;
            Ok(Arc::new(InstructionSummarizer::new(model, max_tokens)) as Arc<dyn Summarizer>)
        }));
        self
    }

    pub fn tagger(&self) -> ModelResult<Arc<dyn EntityTagger>> {
        self.tagger.get()
    }

    pub fn summarizer(&self) -> ModelResult<Arc<dyn Summarizer>> {
        self.summarizer.get()
    }

    pub fn question_answerer(&self) -> ModelResult<Arc<dyn QuestionAnswerer>> {
        self.qa.get()
    }

    pub fn instruction_model(&self) -> ModelResult<Arc<dyn InstructionModel>> {
        self.instruction.get()
    }

    /// Whether a capability has a model configured (loaded or loadable).
    pub fn is_configured(&self, capability: Capability) -> bool {
        match capability {
            Capability::EntityTagging => self.tagger.is_configured(),
            Capability::Summarization => self.summarizer.is_configured(),
            Capability::QuestionAnswering => self.qa.is_configured(),
            Capability::InstructionFollowing => self.instruction.is_configured(),
        }
    }

    /// Wire the on-disk models named in `config`. Nothing is loaded until
    /// a capability is first used.
    #[cfg(feature = "native")]
    pub fn from_config(config: &crate::models::DocexConfig) -> Self {
        use std::time::Duration;

        let models = config.models.clone();
        let mut provider = Self::unavailable();

        if let Some(model) = models.tagger_model.clone() {
            let model_path = models.model_path(&model);
            let tokenizer_path = models.model_path(&models.tagger_tokenizer);
            let labels_path = models.model_path(&models.tagger_labels);
            let threads = models.num_threads;
            provider = provider.with_tagger(LazyModel::new(Capability::EntityTagging, move || {
                let tagger =
                    onnx::OnnxEntityTagger::load(&model_path, &tokenizer_path, &labels_path, threads)?;
                Ok(Arc::new(tagger) as Arc<dyn EntityTagger>)
            }));
        }

        if let Some(model) = models.qa_model.clone() {
            let model_path = models.model_path(&model);
            let tokenizer_path = models.model_path(&models.qa_tokenizer);
            let threads = models.num_threads;
            provider = provider.with_question_answerer(LazyModel::new(
                Capability::QuestionAnswering,
                move || {
                    let qa = onnx::OnnxQuestionAnswerer::load(&model_path, &tokenizer_path, threads)?;
                    Ok(Arc::new(qa) as Arc<dyn QuestionAnswerer>)
                },
            ));
        }

        let llm_path = models.llm_model_path();
        let endpoint = models.llm_endpoint.clone();
        let timeout = config.extraction.generation_timeout_secs.map(Duration::from_secs);
        provider = provider.with_instruction_model(LazyModel::new(
            Capability::InstructionFollowing,
            move || {
                let model = llm::LocalInstructionModel::load(&llm_path, &endpoint, timeout)?;
                Ok(Arc::new(model) as Arc<dyn InstructionModel>)
            },
        ));

        if models.enable_summarization {
            provider = provider.with_instruction_summarizer(config.extraction.max_generated_tokens);
        }

        provider
    }
}

impl Default for ModelProvider {
    fn default() -> Self {
        Self::unavailable()
    }
}
