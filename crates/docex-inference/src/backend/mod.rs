//! Inference backend implementations.

pub mod ort;

use crate::{InputTensor, OutputTensor, Result};

/// Trait for ONNX inference backends.
///
/// Implementations must be shareable across request threads; the model
/// weights are loaded once and only read afterwards.
pub trait InferenceBackend: Send + Sync {
    /// Run inference with the given inputs.
    ///
    /// # Arguments
    /// * `inputs` - Named input tensors
    ///
    /// # Returns
    /// Named output tensors from the model
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Get the input names expected by the model.
    fn input_names(&self) -> &[String];

    /// Get the output names produced by the model.
    fn output_names(&self) -> &[String];

    /// Find an output by name, falling back to the output at `index`.
    fn select_output<'a>(
        &self,
        outputs: &'a [(String, OutputTensor)],
        name: &str,
        index: usize,
    ) -> Option<&'a OutputTensor> {
        outputs
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| outputs.get(index))
            .map(|(_, t)| t)
    }
}
