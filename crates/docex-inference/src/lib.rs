//! ONNX inference abstraction layer for docex.
//!
//! Enrichment models (entity tagging, extractive question answering) are
//! exported to ONNX and executed through ONNX Runtime with the XNNPACK
//! execution provider. Callers only see [`InferenceBackend`] and the
//! tensor wrappers, so tests can drive the model code with a fake backend.

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use backend::ort::OrtBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor, TensorType};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
