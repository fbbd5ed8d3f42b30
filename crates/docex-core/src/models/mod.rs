//! Data models: document categories, extraction records and configuration.

pub mod config;
pub mod document;
pub mod record;

pub use config::{DocexConfig, ExtractionConfig, ModelConfig, PdfConfig};
pub use document::DocumentType;
pub use record::{
    Amount, CustomRecord, EducationEntry, ExperienceEntry, ExtractionOutcome, ExtractionRecord,
    InvoiceRecord, LineItem, Outcome, PaperRecord, QaAnswer, QaOutcome, ResumeRecord, Section,
    TaggedEntity,
};
