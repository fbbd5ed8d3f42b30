//! PDF text layer.
//!
//! Documents reach the processors as raw text. This module pulls the text
//! layer out of a PDF; scanned documents without one simply yield empty
//! text.

mod extractor;

pub use extractor::PdfExtractor;

use std::path::Path;

use tracing::warn;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text extraction implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text of the whole document.
    fn extract_text(&self) -> Result<String>;

    /// Extract the text of one page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

/// Text of a PDF held in memory, limited to `max_pages` (0 = all).
///
/// Unreadable documents produce an empty string; the failure is logged.
pub fn text_from_bytes(data: &[u8], max_pages: usize) -> String {
    let mut extractor = PdfExtractor::new().with_max_pages(max_pages);
    match extractor.load(data).and_then(|_| extractor.extract_text()) {
        Ok(text) => text,
        Err(e) => {
            warn!("Could not read PDF text layer: {}", e);
            String::new()
        }
    }
}

/// Text of the PDF at `path`; see [`text_from_bytes`].
pub fn text_from_path(path: &Path, max_pages: usize) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(text_from_bytes(&data, max_pages))
}
