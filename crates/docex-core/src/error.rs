//! Error types for the docex-core library.
//!
//! A field that is simply not present in the text is not an error: field
//! extractors return `None` or an empty list for that. The enums below
//! cover the conditions a caller may need to tell apart: a model that is
//! unavailable, a model that failed mid-call, and a processor failure.

use thiserror::Error;

/// Main error type for the docex library.
#[derive(Error, Debug)]
pub enum DocexError {
    /// PDF text layer error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Model provider error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Document processing error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Inference error from the inference layer.
    #[cfg(feature = "native")]
    #[error("inference error: {0}")]
    Inference(#[from] docex_inference::InferenceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by the model provider and its capabilities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The capability was never configured or failed to load.
    #[error("{capability} model not available: {reason}")]
    Unavailable { capability: Capability, reason: String },

    /// The model artifact does not exist on disk.
    #[error("{capability} model not found at {path}")]
    NotFound { capability: Capability, path: String },

    /// A loaded model failed while serving a call.
    #[error("{capability} model call failed: {reason}")]
    Failed { capability: Capability, reason: String },

    /// The model answered with something that could not be interpreted.
    #[error("invalid {capability} model output: {reason}")]
    InvalidOutput { capability: Capability, reason: String },
}

impl ModelError {
    /// Whether this error means the capability is absent rather than broken.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::NotFound { .. })
    }

    /// The capability the error belongs to.
    pub fn capability(&self) -> Capability {
        match self {
            Self::Unavailable { capability, .. }
            | Self::NotFound { capability, .. }
            | Self::Failed { capability, .. }
            | Self::InvalidOutput { capability, .. } => *capability,
        }
    }
}

/// Enrichment capabilities a model provider can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    EntityTagging,
    Summarization,
    QuestionAnswering,
    InstructionFollowing,
}

impl Capability {
    /// All capabilities, in a stable order.
    pub const ALL: [Capability; 4] = [
        Capability::EntityTagging,
        Capability::Summarization,
        Capability::QuestionAnswering,
        Capability::InstructionFollowing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityTagging => "entity tagging",
            Self::Summarization => "summarization",
            Self::QuestionAnswering => "QA",
            Self::InstructionFollowing => "instruction",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors related to document processing.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The `other` document type was requested without an instruction.
    #[error("custom prompt is required for documents of type 'other'")]
    MissingPrompt,

    /// The document type name is not one of the supported categories.
    #[error("invalid document type: {0}")]
    InvalidDocumentType(String),

    /// Unexpected failure inside a processor body.
    #[error("{0}")]
    Processing(String),
}

/// Result type for the docex library.
pub type Result<T> = std::result::Result<T, DocexError>;
