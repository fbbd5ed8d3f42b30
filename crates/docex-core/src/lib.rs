//! Core library for document field extraction.
//!
//! This crate provides:
//! - Regex rule cascades and field extractors for invoices, resumes and
//!   research papers
//! - Document type processors with a uniform `{"error": ...}` failure shape
//! - A model provider with lazily loaded, independently optional
//!   enrichment capabilities (entity tagging, summarization, question
//!   answering, instruction following)
//! - A PDF text layer (native builds)

pub mod error;
pub mod extract;
pub mod models;
#[cfg(feature = "native")]
pub mod pdf;
pub mod processor;
pub mod provider;

pub use error::{Capability, DocexError, ExtractionError, ModelError, PdfError, Result};
pub use models::{
    Amount, CustomRecord, DocexConfig, DocumentType, ExtractionConfig, ExtractionOutcome,
    ExtractionRecord, InvoiceRecord, ModelConfig, Outcome, PaperRecord, QaAnswer, QaOutcome,
    ResumeRecord, TaggedEntity,
};
pub use processor::{DocumentProcessor, sanitize_prompt};
pub use provider::{LazyModel, ModelProvider};

#[cfg(feature = "native")]
pub use pdf::{PdfExtractor, PdfProcessor};
