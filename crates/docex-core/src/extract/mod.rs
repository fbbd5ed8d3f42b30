//! Heuristic field extraction.
//!
//! Every extractor is a pure function of the raw text. Extractors never
//! fail: a field that cannot be found is `None` or an empty list, and no
//! extractor sees another extractor's output.

pub mod invoice;
pub mod paper;
pub mod resume;
pub mod rules;
pub mod text;

pub use invoice::InvoiceExtractor;
pub use paper::PaperExtractor;
pub use resume::ResumeExtractor;
pub use rules::{Cascade, FieldExtractor, Rule, RuleMatch, Selection};
