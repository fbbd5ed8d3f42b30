//! Invoice field extraction.

use std::str::FromStr;

use lazy_static::lazy_static;
use rust_decimal::Decimal;

use super::rules::{
    Cascade, FieldExtractor, Rule, Selection, DATE_DMY, DATE_TEXTUAL, DATE_YMD, DIGIT,
    DOLLAR_AMOUNT, INVOICE_ABBREVIATED, INVOICE_HASH, INVOICE_LABELED, LABELED_AMOUNT,
    LINE_ITEM_PRICE, TOTAL_AMOUNT,
};
use super::text::{char_len, head_lines};
use crate::models::record::{Amount, InvoiceRecord, LineItem};

/// Lines scanned from the top of the document for the vendor name.
const VENDOR_SCAN_LINES: usize = 5;
const MIN_VENDOR_CHARS: usize = 3;
const MIN_LINE_ITEM_CHARS: usize = 10;
const MAX_LINE_ITEMS: usize = 10;

lazy_static! {
    static ref INVOICE_NUMBER: Cascade = Cascade::new(
        vec![
            Rule::new("invoice", &INVOICE_LABELED, 1),
            Rule::new("inv", &INVOICE_ABBREVIATED, 1),
            Rule::new("hash", &INVOICE_HASH, 1),
        ],
        Selection::First,
    );

    static ref DATE: Cascade = Cascade::new(
        vec![
            Rule::new("day_month_year", &DATE_DMY, 1),
            Rule::new("year_month_day", &DATE_YMD, 1),
            // Whole match, so the day and year come with the month name.
            Rule::new("month_name", &DATE_TEXTUAL, 0),
        ],
        Selection::First,
    );

    // Amounts are usually listed with the grand total last.
    static ref TOTAL: Cascade = Cascade::new(
        vec![
            Rule::new("total", &TOTAL_AMOUNT, 1),
            Rule::new("amount", &LABELED_AMOUNT, 1),
            Rule::new("dollar", &DOLLAR_AMOUNT, 1),
        ],
        Selection::Last,
    );
}

/// Invoice field extractor.
pub struct InvoiceExtractor;

impl InvoiceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run every invoice field extractor over `text`.
    pub fn extract(&self, text: &str) -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: extract_invoice_number(text),
            date: extract_date(text),
            vendor_name: extract_vendor_name(text),
            total_amount: extract_total_amount(text),
            line_items: extract_line_items(text),
            entities: None,
        }
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn extract_invoice_number(text: &str) -> Option<String> {
    INVOICE_NUMBER.extract(text)
}

pub fn extract_date(text: &str) -> Option<String> {
    DATE.extract(text)
}

/// First of the top lines that is long enough and contains no digits.
pub fn extract_vendor_name(text: &str) -> Option<String> {
    head_lines(text, VENDOR_SCAN_LINES)
        .find(|line| char_len(line.trim()) > MIN_VENDOR_CHARS && !DIGIT.is_match(line))
        .map(|line| line.trim().to_string())
}

/// Last amount of the highest-priority amount rule that matches.
///
/// A value that fails to parse moves on to the next rule.
pub fn extract_total_amount(text: &str) -> Option<Amount> {
    TOTAL.find_map(text, |m| parse_amount(m.value))
}

pub fn extract_line_items(text: &str) -> Vec<LineItem> {
    text.lines()
        .filter(|line| LINE_ITEM_PRICE.is_match(line) && char_len(line.trim()) > MIN_LINE_ITEM_CHARS)
        .take(MAX_LINE_ITEMS)
        .map(|line| LineItem {
            description: line.trim().to_string(),
        })
        .collect()
}

/// Parse a plain dotted amount such as `12.50` or `12.`.
///
/// Digit runs past the `Decimal` range fall back to the nearest float.
pub fn parse_amount(s: &str) -> Option<Amount> {
    let s = s.trim().trim_end_matches('.');
    if s.is_empty() {
        return None;
    }
    match Decimal::from_str(s) {
        Ok(value) => Some(Amount::Exact(value)),
        Err(_) => s
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Amount::Approximate),
    }
}
