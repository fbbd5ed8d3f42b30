//! Common regex patterns for document field extraction.
//!
//! Field patterns are case-insensitive unless the shape itself depends on
//! letter case (names, section headers, email/phone shapes).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number patterns, in priority order
    pub static ref INVOICE_LABELED: Regex = Regex::new(
        r"(?i)invoice\s*#?\s*:?\s*([A-Z0-9-]+)"
    ).unwrap();

    pub static ref INVOICE_ABBREVIATED: Regex = Regex::new(
        r"(?i)inv\s*#?\s*:?\s*([A-Z0-9-]+)"
    ).unwrap();

    pub static ref INVOICE_HASH: Regex = Regex::new(
        r"(?i)#\s*([A-Z0-9-]+)"
    ).unwrap();

    // Date patterns
    pub static ref DATE_DMY: Regex = Regex::new(
        r"(?i)\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"(?i)\b(\d{4}[/-]\d{1,2}[/-]\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_TEXTUAL: Regex = Regex::new(
        r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2},?\s+\d{4}\b"
    ).unwrap();

    pub static ref DIGIT: Regex = Regex::new(r"\d").unwrap();

    // Amount patterns, in priority order
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)total\s*:?\s*\$?(\d+\.?\d*)"
    ).unwrap();

    pub static ref LABELED_AMOUNT: Regex = Regex::new(
        r"(?i)amount\s*:?\s*\$?(\d+\.?\d*)"
    ).unwrap();

    pub static ref DOLLAR_AMOUNT: Regex = Regex::new(
        r"\$(\d+\.?\d*)"
    ).unwrap();

    pub static ref LINE_ITEM_PRICE: Regex = Regex::new(r"\$\d+").unwrap();

    // Contact details
    pub static ref CONTACT_MARKER: Regex = Regex::new(
        r"(?i)@|phone|email|address"
    ).unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"
    ).unwrap();

    pub static ref PHONE_PLAIN: Regex = Regex::new(
        r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b"
    ).unwrap();

    pub static ref PHONE_AREA_CODE: Regex = Regex::new(
        r"\(\d{3}\)\s*\d{3}[-.]?\d{4}"
    ).unwrap();

    // Research paper structure
    pub static ref AUTHOR_NAME: Regex = Regex::new(
        r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b"
    ).unwrap();

    pub static ref ABSTRACT_MARKER: Regex = Regex::new(
        r"(?i)abstract\s*:?\s*"
    ).unwrap();

    pub static ref ABSTRACT_END: Regex = Regex::new(
        r"(?i)\n(?:\n|keywords|introduction)"
    ).unwrap();

    pub static ref KEYWORDS_MARKER: Regex = Regex::new(
        r"(?i)keywords?\s*:?\s*"
    ).unwrap();

    pub static ref KEYWORDS_END: Regex = Regex::new(
        r"(?i)\A\n(?:\n|introduction)"
    ).unwrap();

    pub static ref SECTION_HEADER: Regex = Regex::new(
        r"\n([A-Z][A-Za-z\s]+)\n"
    ).unwrap();
}
