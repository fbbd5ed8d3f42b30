//! Declared document categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Category of an uploaded document; selects which extractors run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    Resume,
    ResearchPaper,
    /// Free-form document handled by a user instruction.
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Invoice,
        DocumentType::Resume,
        DocumentType::ResearchPaper,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Resume => "resume",
            Self::ResearchPaper => "research_paper",
            Self::Other => "other",
        }
    }

    /// Only free-form documents need a custom instruction.
    pub fn requires_prompt(&self) -> bool {
        matches!(self, Self::Other)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" => Ok(Self::Invoice),
            "resume" => Ok(Self::Resume),
            "research_paper" | "research-paper" | "paper" => Ok(Self::ResearchPaper),
            "other" | "custom" => Ok(Self::Other),
            other => Err(ExtractionError::InvalidDocumentType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_type() {
        assert_eq!("invoice".parse::<DocumentType>().unwrap(), DocumentType::Invoice);
        assert_eq!(
            "Research_Paper".parse::<DocumentType>().unwrap(),
            DocumentType::ResearchPaper
        );
        assert!("receipt".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for ty in DocumentType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty));
        }
    }

    #[test]
    fn test_only_other_requires_prompt() {
        assert!(DocumentType::Other.requires_prompt());
        assert!(!DocumentType::Invoice.requires_prompt());
    }
}
