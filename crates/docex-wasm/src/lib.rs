//! WASM bindings for document field extraction.
//!
//! Only the heuristic path runs in the browser: no enrichment model is
//! available, so records never carry `entities` or `summary`, and the
//! `other` document type answers with an `{error}` record.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use docex_core::{DocumentProcessor, DocumentType, ExtractionConfig};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract the fields of `document_type` from `text`.
///
/// Returns the record as a plain object, or `{error}` when processing
/// failed. An unknown document type is thrown as an error.
#[wasm_bindgen]
pub fn extract(text: &str, document_type: &str) -> Result<JsValue, JsValue> {
    DocumentExtractor::new().extract(text, document_type)
}

/// Strip instruction delimiters from a user prompt and cap its length.
#[wasm_bindgen]
pub fn sanitize_prompt(prompt: &str) -> String {
    docex_core::sanitize_prompt(prompt, ExtractionConfig::default().max_prompt_length)
}

/// Names accepted by [`extract`].
#[wasm_bindgen]
pub fn document_types() -> js_sys::Array {
    DocumentType::ALL
        .iter()
        .map(|ty| JsValue::from_str(ty.as_str()))
        .collect()
}

/// Reusable extractor for browser use.
#[wasm_bindgen]
pub struct DocumentExtractor {
    processor: DocumentProcessor,
}

#[wasm_bindgen]
impl DocumentExtractor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            processor: DocumentProcessor::heuristic_only(),
        }
    }

    /// Extract the fields of `document_type` from `text`.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str, document_type: &str) -> Result<JsValue, JsValue> {
        let document_type: DocumentType = document_type
            .parse()
            .map_err(|e: docex_core::ExtractionError| JsValue::from_str(&e.to_string()))?;

        let outcome = self.processor.process(text, document_type, None);
        to_js(&outcome.to_json())
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize JSON maps as plain objects rather than `Map`s.
fn to_js(value: &serde_json::Value) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
