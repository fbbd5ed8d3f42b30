//! Research paper metadata extraction.

use super::rules::{
    ABSTRACT_END, ABSTRACT_MARKER, AUTHOR_NAME, KEYWORDS_END, KEYWORDS_MARKER, SECTION_HEADER,
};
use super::text::{char_len, head_lines};
use crate::models::record::{PaperRecord, Section};

const TITLE_SCAN_LINES: usize = 5;
const AUTHOR_SCAN_LINES: usize = 10;
const MAX_AUTHORS: usize = 5;
const MAX_KEYWORDS: usize = 10;
const MAX_SECTIONS: usize = 10;

/// Research paper field extractor.
pub struct PaperExtractor;

impl PaperExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run every paper field extractor over `text`.
    pub fn extract(&self, text: &str) -> PaperRecord {
        PaperRecord {
            title: extract_title(text),
            authors: extract_authors(text),
            abstract_text: extract_abstract(text),
            keywords: extract_keywords(text),
            sections: extract_sections(text),
            summary: None,
        }
    }
}

impl Default for PaperExtractor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn extract_title(text: &str) -> Option<String> {
    head_lines(text, TITLE_SCAN_LINES)
        .map(str::trim)
        .find(|line| {
            let len = char_len(line);
            len > 10 && len < 200
        })
        .map(str::to_string)
}

/// Top lines that mention an author or contain a `Given Family` name shape.
pub fn extract_authors(text: &str) -> Vec<String> {
    head_lines(text, AUTHOR_SCAN_LINES)
        .filter(|line| line.to_lowercase().contains("author") || AUTHOR_NAME.is_match(line))
        .take(MAX_AUTHORS)
        .map(|line| line.trim().to_string())
        .collect()
}

/// Text after an "Abstract" marker, up to the next blank line or a
/// "Keywords"/"Introduction" line. An unterminated abstract is not reported.
pub fn extract_abstract(text: &str) -> Option<String> {
    ABSTRACT_MARKER.find_iter(text).find_map(|marker| {
        let body = &text[marker.end()..];
        ABSTRACT_END
            .find(body)
            .map(|end| body[..end.start()].trim().to_string())
    })
}

/// Comma-separated keywords on the line after a "Keywords" marker. The
/// line must be followed by a blank line or an "Introduction" line.
pub fn extract_keywords(text: &str) -> Vec<String> {
    KEYWORDS_MARKER
        .find_iter(text)
        .find_map(|marker| {
            let rest = &text[marker.end()..];
            let line_end = rest.find('\n')?;
            KEYWORDS_END
                .is_match(&rest[line_end..])
                .then(|| &rest[..line_end])
        })
        .map(|line| {
            line.split(',')
                .take(MAX_KEYWORDS)
                .map(str::trim)
                .filter(|kw| !kw.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Capitalized letter-only header blocks framed by newlines.
pub fn extract_sections(text: &str) -> Vec<Section> {
    SECTION_HEADER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .take(MAX_SECTIONS)
        .map(|m| Section {
            title: m.as_str().trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAPER: &str = "Learning Sparse Representations for Retrieval\n\
                         Alice Smith, Bob Jones\n\
                         Department of Computing\n\
                         Abstract: We propose a sparse encoder.\n\
                         It improves recall.\n\
                         Keywords: retrieval, sparsity, encoders\n\
                         \n\
                         Introduction\n\
                         Dense retrieval is popular.\n";

    #[test]
    fn test_title() {
        assert_eq!(
            extract_title(PAPER),
            Some("Learning Sparse Representations for Retrieval".to_string())
        );
        assert_eq!(extract_title("short\n\n"), None);
    }

    #[test]
    fn test_authors_use_name_shape() {
        let authors = extract_authors(PAPER);
        assert_eq!(authors[0], "Learning Sparse Representations for Retrieval");
        assert_eq!(authors[1], "Alice Smith, Bob Jones");
        assert!(authors.len() <= 5);
    }

    #[test]
    fn test_author_marker_line() {
        let text = "paper\ncorresponding author: x@y.org\n";
        assert_eq!(extract_authors(text), vec!["corresponding author: x@y.org"]);
    }

    #[test]
    fn test_abstract_stops_at_keywords() {
        assert_eq!(
            extract_abstract(PAPER),
            Some("We propose a sparse encoder.\nIt improves recall.".to_string())
        );
    }

    #[test]
    fn test_abstract_stops_at_blank_line() {
        let text = "ABSTRACT\nShort summary here.\n\nBody text";
        assert_eq!(extract_abstract(text), Some("Short summary here.".to_string()));
    }

    #[test]
    fn test_unterminated_abstract() {
        assert_eq!(extract_abstract("Abstract: runs to the end"), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(extract_keywords(PAPER), vec!["retrieval", "sparsity", "encoders"]);
    }

    #[test]
    fn test_keywords_require_terminator() {
        assert!(extract_keywords("Keywords: a, b\nmore text").is_empty());
    }

    #[test]
    fn test_keywords_capped() {
        let list: Vec<String> = (0..15).map(|i| format!("k{}", i)).collect();
        let text = format!("Keywords: {}\n\n", list.join(", "));
        assert_eq!(extract_keywords(&text).len(), 10);
    }

    #[test]
    fn test_sections() {
        let text = "Title line.\nIntroduction\n1 text.\nRelated Work\n2 text.\n";
        let titles: Vec<String> = extract_sections(text).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Introduction", "Related Work"]);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(PaperExtractor::new().extract(""), PaperRecord::default());
    }
}
