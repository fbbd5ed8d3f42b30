//! PDF text extraction using pdf-extract with a lopdf fallback.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
///
/// `pdf-extract` gives the best reading order; when it fails (or panics on
/// an unusual font program) the per-page `lopdf` text is used instead.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    max_pages: usize,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            max_pages: 0,
        }
    }

    /// Only read the first `max_pages` pages (0 = all).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    fn page_limit(&self) -> u32 {
        let pages = self.page_count();
        if self.max_pages == 0 {
            pages
        } else {
            pages.min(self.max_pages as u32)
        }
    }

    fn extract_with_pdf_extract(&self) -> Result<String> {
        let data = &self.raw_data;
        panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data)))
            .map_err(|_| PdfError::TextExtraction("pdf-extract panicked".to_string()))?
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_with_lopdf(&self, pages: u32) -> Result<String> {
        let mut text = String::new();
        for page in 1..=pages {
            match self.extract_page_text(page) {
                Ok(page_text) if !page_text.trim().is_empty() => {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&page_text);
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping page {}: {}", page, e),
            }
        }
        Ok(text)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            doc.decrypt("").map_err(|_| PdfError::Encrypted)?;
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;
        let limit = self.page_limit();

        if limit < self.page_count() {
            return self.extract_with_lopdf(limit);
        }

        match self.extract_with_pdf_extract() {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("Falling back to per-page text extraction: {}", e);
                self.extract_with_lopdf(limit)
            }
        }
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::text_from_bytes;

    #[test]
    fn test_new_extractor_is_empty() {
        let extractor = PdfExtractor::new();
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_text().is_err());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(extractor.load(b"not a pdf"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_unreadable_bytes_give_empty_text() {
        assert_eq!(text_from_bytes(b"%PDF-garbage", 0), "");
    }
}
