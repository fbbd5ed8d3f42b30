//! Extraction records produced by the document processors.
//!
//! Every record type serializes all of its heuristic fields, using `null`
//! or `[]` when nothing was found, so consumers can tell "not found" from
//! "not attempted". Model enrichment keys (`entities`, `summary`) are only
//! present when the enrichment actually ran.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use super::document::DocumentType;

/// Extracted invoice fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_number: Option<String>,
    pub date: Option<String>,
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Amount>,
    pub line_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub entities: Option<Vec<TaggedEntity>>,
}

/// A monetary amount, serialized as a plain JSON number.
///
/// Digit runs too long for a `Decimal` keep their nearest float value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Exact(Decimal),
    Approximate(f64),
}

impl Amount {
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Exact(value) => value.to_f64().unwrap_or(f64::NAN),
            Self::Approximate(value) => value,
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::Exact(value)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Decimal::from_f64(value).map_or(Self::Approximate(value), Self::Exact)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::from)
    }
}

/// A line of an invoice that carries a dollar amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
}

/// Extracted resume fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub entities: Option<Vec<TaggedEntity>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub position: String,
}

/// Extracted research paper metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: Option<String>,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
}

/// Result of an instruction-driven extraction over a free-form document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRecord {
    /// The sanitized instruction that was actually sent to the model.
    pub prompt_used: String,
    /// Identifier of the local model artifact.
    pub model: String,
    /// Per-chunk responses joined in chunk order.
    pub result: String,
}

/// A named entity reported by the tagging model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedEntity {
    /// Predicted label, e.g. `B-ORG`.
    pub entity: String,
    pub score: f64,
    /// Token index in the tagged window.
    pub index: usize,
    pub word: String,
    /// Character offsets into the tagged window.
    pub start: usize,
    pub end: usize,
}

/// Answer to a question asked about a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaAnswer {
    pub question: String,
    pub answer: Option<String>,
    pub score: Option<f64>,
}

/// A structured record for one of the document types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionRecord {
    Invoice(InvoiceRecord),
    Resume(ResumeRecord),
    ResearchPaper(PaperRecord),
    Custom(CustomRecord),
}

impl ExtractionRecord {
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::Invoice(_) => DocumentType::Invoice,
            Self::Resume(_) => DocumentType::Resume,
            Self::ResearchPaper(_) => DocumentType::ResearchPaper,
            Self::Custom(_) => DocumentType::Other,
        }
    }
}

/// Either a value or a tagged `{"error": message}` payload.
///
/// This is the shape returned across the engine boundary: callers must
/// check [`Outcome::is_error`] before reading record fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Ok(T),
    Failed { error: String },
}

pub type ExtractionOutcome = Outcome<ExtractionRecord>;
pub type QaOutcome = Outcome<QaAnswer>;

impl<T> Outcome<T> {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed { error: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Ok(_) => None,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    pub fn as_ok(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }
}

impl<T: Serialize> Outcome<T> {
    /// Convert to a plain JSON value.
    ///
    /// Decimal amounts become JSON floats, scores become JSON numbers and
    /// non-finite floats become `null`; nothing library-specific survives.
    /// A value that cannot be serialized turns into the error shape.
    pub fn to_json(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(value) => value,
            Err(e) => json!({ "error": format!("failed to serialize record: {}", e) }),
        }
    }
}
