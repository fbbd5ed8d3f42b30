//! Document type processors.
//!
//! A processor turns raw document text into the record for its document
//! type. Templated types (invoice, resume, research paper) run their field
//! extractors and then try the optional model enrichment; free-form
//! documents are handed to the instruction model together with the user's
//! instruction.
//!
//! Processors never fail outward. A missing, failing or panicking
//! enrichment model only drops the enrichment key; anything else that goes wrong inside a
//! processor body, panics included, is logged and returned as
//! `{"error": message}`.

mod custom;
pub mod prompt;

pub use prompt::{format_instruction, sanitize_prompt};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{DocexError, ExtractionError, ModelError, Result};
use crate::extract::text::truncate_chars;
use crate::extract::{InvoiceExtractor, PaperExtractor, ResumeExtractor};
use crate::models::{
    DocumentType, ExtractionConfig, ExtractionOutcome, ExtractionRecord, InvoiceRecord, Outcome,
    PaperRecord, QaAnswer, QaOutcome, ResumeRecord, TaggedEntity,
};
use crate::provider::{ModelProvider, ModelResult};

/// Message returned when no question answering model can be loaded.
pub const QA_UNAVAILABLE: &str = "QA model not available";

/// Routes documents to the processor for their type.
pub struct DocumentProcessor {
    provider: Arc<ModelProvider>,
    config: ExtractionConfig,
    invoice: InvoiceExtractor,
    resume: ResumeExtractor,
    paper: PaperExtractor,
}

impl DocumentProcessor {
    pub fn new(provider: Arc<ModelProvider>) -> Self {
        Self {
            provider,
            config: ExtractionConfig::default(),
            invoice: InvoiceExtractor::new(),
            resume: ResumeExtractor::new(),
            paper: PaperExtractor::new(),
        }
    }

    /// A processor with every model capability unavailable.
    pub fn heuristic_only() -> Self {
        Self::new(Arc::new(ModelProvider::unavailable()))
    }

    /// Set the processing windows and limits.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &ModelProvider {
        &self.provider
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Process `text` as a document of `document_type`.
    ///
    /// `prompt` is only read for [`DocumentType::Other`], where it is
    /// required.
    pub fn process(
        &self,
        text: &str,
        document_type: DocumentType,
        prompt: Option<&str>,
    ) -> ExtractionOutcome {
        info!(
            "Processing {} document ({} chars)",
            document_type,
            text.chars().count()
        );
        guarded(document_type.as_str(), || self.extract(text, document_type, prompt))
    }

    pub fn process_invoice(&self, text: &str) -> ExtractionOutcome {
        self.process(text, DocumentType::Invoice, None)
    }

    pub fn process_resume(&self, text: &str) -> ExtractionOutcome {
        self.process(text, DocumentType::Resume, None)
    }

    pub fn process_research_paper(&self, text: &str) -> ExtractionOutcome {
        self.process(text, DocumentType::ResearchPaper, None)
    }

    pub fn process_custom(&self, text: &str, prompt: &str) -> ExtractionOutcome {
        self.process(text, DocumentType::Other, Some(prompt))
    }

    /// Answer a free-form question about `text`.
    pub fn answer_question(&self, text: &str, question: &str) -> QaOutcome {
        let qa = match self.provider.question_answerer() {
            Ok(qa) => qa,
            Err(e) => {
                warn!("Question answering skipped: {}", e);
                return Outcome::failed(QA_UNAVAILABLE);
            }
        };

        guarded("question answering", || {
            let answer = qa.answer(text, question)?;
            Ok(QaAnswer {
                question: question.to_string(),
                answer: Some(answer.text),
                score: Some(answer.score),
            })
        })
    }

    /// Unguarded dispatch; errors propagate to the caller.
    pub fn extract(
        &self,
        text: &str,
        document_type: DocumentType,
        prompt: Option<&str>,
    ) -> Result<ExtractionRecord> {
        match document_type {
            DocumentType::Invoice => Ok(ExtractionRecord::Invoice(self.invoice_record(text))),
            DocumentType::Resume => Ok(ExtractionRecord::Resume(self.resume_record(text))),
            DocumentType::ResearchPaper => {
                Ok(ExtractionRecord::ResearchPaper(self.paper_record(text)))
            }
            DocumentType::Other => {
                let prompt = prompt.ok_or(ExtractionError::MissingPrompt)?;
                self.custom_record(text, prompt).map(ExtractionRecord::Custom)
            }
        }
    }

    fn invoice_record(&self, text: &str) -> InvoiceRecord {
        let mut record = self.invoice.extract(text);
        record.entities = self.tag_entities(text);
        record
    }

    fn resume_record(&self, text: &str) -> ResumeRecord {
        let mut record = self.resume.extract(text);
        record.entities = self.tag_entities(text);
        record
    }

    fn paper_record(&self, text: &str) -> PaperRecord {
        let mut record = self.paper.extract(text);
        record.summary = self.summarize(text);
        record
    }

    /// Entities over the leading window, or `None` when tagging did not run.
    fn tag_entities(&self, text: &str) -> Option<Vec<TaggedEntity>> {
        let window = truncate_chars(text, self.config.entity_window);
        if window.trim().is_empty() {
            return None;
        }
        let tagger = enrichment_model(self.provider.tagger())?;

        debug!("Tagging entities in a {} char window", window.chars().count());
        best_effort("Entity tagging", || tagger.tag(window))
    }

    fn summarize(&self, text: &str) -> Option<String> {
        let window = truncate_chars(text, self.config.summary_window);
        if window.trim().is_empty() {
            return None;
        }
        let summarizer = enrichment_model(self.provider.summarizer())?;

        debug!("Summarizing a {} char window", window.chars().count());
        best_effort("Summarization", || {
            summarizer.summarize(
                window,
                self.config.summary_min_length,
                self.config.summary_max_length,
            )
        })
    }
}

/// An acquired enrichment model; absence is quiet, load failures warn.
fn enrichment_model<T: ?Sized>(acquired: std::result::Result<Arc<T>, ModelError>) -> Option<Arc<T>> {
    match acquired {
        Ok(model) => Some(model),
        Err(e) if e.is_unavailable() => {
            debug!("Enrichment skipped: {}", e);
            None
        }
        Err(e) => {
            warn!("Enrichment skipped: {}", e);
            None
        }
    }
}

/// Run one enrichment call. Errors and panics only drop the enrichment.
fn best_effort<T>(what: &str, call: impl FnOnce() -> ModelResult<T>) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!("{} failed, omitting it: {}", what, e);
            None
        }
        Err(payload) => {
            warn!("{} panicked, omitting it: {}", what, panic_message(payload.as_ref()));
            None
        }
    }
}

/// Run a processor body, turning errors and panics into `{error}`.
fn guarded<T>(what: &str, body: impl FnOnce() -> Result<T>) -> Outcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => Outcome::Ok(value),
        Ok(Err(e)) => {
            error!("{} processing failed: {}", what, e);
            Outcome::failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("{} processing panicked: {}", what, message);
            Outcome::failed(DocexError::from(ExtractionError::Processing(message)).to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Capability;
    use crate::provider::{Answer, EntityTagger, LazyModel, QuestionAnswerer, Summarizer};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    const INVOICE: &str = "Acme Supplies Ltd\n\
                           Invoice #: A-1001\n\
                           Date: 03/14/2024\n\
                           Subtotal: $10.00\n\
                           Total: $12.50\n";

    struct WindowTagger {
        seen: Mutex<Vec<String>>,
    }

    impl EntityTagger for WindowTagger {
        fn tag(&self, text: &str) -> ModelResult<Vec<TaggedEntity>> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(vec![TaggedEntity {
                entity: "B-ORG".to_string(),
                score: 0.98,
                index: 1,
                word: "Acme".to_string(),
                start: 0,
                end: 4,
            }])
        }
    }

    struct BrokenTagger;

    impl EntityTagger for BrokenTagger {
        fn tag(&self, _text: &str) -> ModelResult<Vec<TaggedEntity>> {
            Err(ModelError::Failed {
                capability: Capability::EntityTagging,
                reason: "out of memory".to_string(),
            })
        }
    }

    struct PanickingTagger;

    impl EntityTagger for PanickingTagger {
        fn tag(&self, _text: &str) -> ModelResult<Vec<TaggedEntity>> {
            panic!("tensor shape mismatch");
        }
    }

    struct PanickingSummary;

    impl Summarizer for PanickingSummary {
        fn summarize(&self, _text: &str, _min: usize, _max: usize) -> ModelResult<String> {
            panic!("summary decoder crashed");
        }
    }

    struct FixedSummary;

    impl Summarizer for FixedSummary {
        fn summarize(&self, text: &str, min: usize, max: usize) -> ModelResult<String> {
            Ok(format!("{} chars, {}-{} words", text.chars().count(), min, max))
        }
    }

    struct FixedAnswer;

    impl QuestionAnswerer for FixedAnswer {
        fn answer(&self, _context: &str, _question: &str) -> ModelResult<Answer> {
            Ok(Answer {
                text: "Acme Supplies Ltd".to_string(),
                score: 0.91,
            })
        }
    }

    fn with_tagger(tagger: Arc<dyn EntityTagger>) -> DocumentProcessor {
        let provider = ModelProvider::unavailable()
            .with_tagger(LazyModel::ready(Capability::EntityTagging, tagger));
        DocumentProcessor::new(Arc::new(provider))
    }

    #[test]
    fn test_invoice_without_models() {
        let outcome = DocumentProcessor::heuristic_only().process_invoice(INVOICE);
        let json = outcome.to_json();

        assert_eq!(json["invoice_number"], json!("A-1001"));
        assert_eq!(json["total_amount"], json!(12.5));
        assert!(json.get("entities").is_none());
    }

    #[test]
    fn test_entities_use_leading_window() {
        let tagger = Arc::new(WindowTagger {
            seen: Mutex::new(Vec::new()),
        });
        let processor = with_tagger(tagger.clone());
        let text = "é".repeat(2000);

        let outcome = processor.process_resume(&text);
        assert!(!outcome.is_error());
        let seen = tagger.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].chars().count(), 512);

        let json = outcome.to_json();
        assert_eq!(json["entities"][0]["entity"], json!("B-ORG"));
        assert_eq!(json["entities"][0]["score"], json!(0.98));
    }

    #[test]
    fn test_failed_enrichment_keeps_heuristic_fields() {
        let outcome = with_tagger(Arc::new(BrokenTagger)).process_invoice(INVOICE);
        let record = outcome.ok().unwrap();
        let ExtractionRecord::Invoice(invoice) = record else {
            panic!("expected an invoice record");
        };
        assert_eq!(invoice.vendor_name.as_deref(), Some("Acme Supplies Ltd"));
        assert!(invoice.entities.is_none());
    }

    #[test]
    fn test_panicking_tagger_keeps_heuristic_fields() {
        let json = with_tagger(Arc::new(PanickingTagger))
            .process_invoice("Acme Supplies Ltd\nTotal: $12.50\n")
            .to_json();

        assert_eq!(json["vendor_name"], json!("Acme Supplies Ltd"));
        assert_eq!(json["total_amount"], json!(12.5));
        assert!(json.get("entities").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_panicking_summarizer_keeps_heuristic_fields() {
        let provider = ModelProvider::unavailable().with_summarizer(LazyModel::ready(
            Capability::Summarization,
            Arc::new(PanickingSummary) as Arc<dyn Summarizer>,
        ));
        let json = DocumentProcessor::new(Arc::new(provider))
            .process_research_paper("A Study of Sparse Retrieval\n")
            .to_json();

        assert_eq!(json["title"], json!("A Study of Sparse Retrieval"));
        assert!(json.get("summary").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_panic_in_processor_body_becomes_error() {
        let outcome: Outcome<()> = guarded("Invoice", || panic!("tensor shape mismatch"));
        assert_eq!(
            outcome.error(),
            Some("extraction error: tensor shape mismatch")
        );
    }

    #[test]
    fn test_paper_summary_window() {
        let provider = ModelProvider::unavailable().with_summarizer(LazyModel::ready(
            Capability::Summarization,
            Arc::new(FixedSummary) as Arc<dyn Summarizer>,
        ));
        let processor = DocumentProcessor::new(Arc::new(provider));
        let text = format!("A Study of Sparse Retrieval\n{}", "x".repeat(3000));

        let json = processor.process_research_paper(&text).to_json();
        assert_eq!(json["summary"], json!("1024 chars, 50-150 words"));
        assert_eq!(json["title"], json!("A Study of Sparse Retrieval"));
    }

    #[test]
    fn test_paper_without_summarizer_has_no_summary_key() {
        let json = DocumentProcessor::heuristic_only()
            .process_research_paper("Some Research Paper Title\n")
            .to_json();
        assert!(json.get("summary").is_none());
        assert!(json.get("abstract").is_some());
    }

    #[test]
    fn test_empty_text_is_well_formed() {
        let processor = with_tagger(Arc::new(WindowTagger {
            seen: Mutex::new(Vec::new()),
        }));
        for document_type in [
            DocumentType::Invoice,
            DocumentType::Resume,
            DocumentType::ResearchPaper,
        ] {
            let outcome = processor.process("", document_type, None);
            assert!(!outcome.is_error());
            assert_eq!(outcome.as_ok().map(|r| r.document_type()), Some(document_type));
        }
        assert_eq!(
            processor.process_invoice("").to_json(),
            json!({
                "invoice_number": null,
                "date": null,
                "vendor_name": null,
                "total_amount": null,
                "line_items": [],
            })
        );
        assert_eq!(
            processor.process_resume("").to_json(),
            json!({
                "name": null,
                "email": null,
                "phone": null,
                "education": [],
                "experience": [],
                "skills": [],
            })
        );
        assert_eq!(
            processor.process_research_paper("").to_json(),
            json!({
                "title": null,
                "authors": [],
                "abstract": null,
                "keywords": [],
                "sections": [],
            })
        );
    }

    #[test]
    fn test_processing_is_idempotent() {
        let processor = DocumentProcessor::heuristic_only();
        for document_type in [
            DocumentType::Invoice,
            DocumentType::Resume,
            DocumentType::ResearchPaper,
        ] {
            assert_eq!(
                processor.process(INVOICE, document_type, None),
                processor.process(INVOICE, document_type, None)
            );
        }
    }

    #[test]
    fn test_other_requires_prompt() {
        let outcome = DocumentProcessor::heuristic_only().process("text", DocumentType::Other, None);
        assert_eq!(
            outcome.error(),
            Some("extraction error: custom prompt is required for documents of type 'other'")
        );
    }

    #[test]
    fn test_qa_unavailable() {
        let outcome = DocumentProcessor::heuristic_only().answer_question(INVOICE, "Who?");
        assert_eq!(outcome.to_json(), json!({ "error": "QA model not available" }));
    }

    #[test]
    fn test_qa_answer_shape() {
        let provider = ModelProvider::unavailable().with_question_answerer(LazyModel::ready(
            Capability::QuestionAnswering,
            Arc::new(FixedAnswer) as Arc<dyn QuestionAnswerer>,
        ));
        let outcome = DocumentProcessor::new(Arc::new(provider))
            .answer_question(INVOICE, "Who issued the invoice?");

        assert_eq!(
            outcome.to_json(),
            json!({
                "question": "Who issued the invoice?",
                "answer": "Acme Supplies Ltd",
                "score": 0.91,
            })
        );
    }
}
