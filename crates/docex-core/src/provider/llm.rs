//! Local instruction-following model.
//!
//! The quantized GGUF weights are served by a llama.cpp-compatible server
//! running on the same host. The model artifact must exist on disk before
//! the capability is considered available; generation goes through the
//! server's `/completion` endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{GenerationParams, INSTRUCTION_MODEL_ID, InstructionModel, ModelResult};
use crate::error::{Capability, ModelError};

const CAPABILITY: Capability = Capability::InstructionFollowing;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: usize,
    stop: &'a [String],
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

/// Instruction model backed by a local GGUF artifact.
#[derive(Debug, Clone)]
pub struct LocalInstructionModel {
    model_path: PathBuf,
    completion_url: String,
    client: reqwest::blocking::Client,
}

impl LocalInstructionModel {
    /// Check the artifact and prepare a client for `endpoint`.
    ///
    /// Returns [`ModelError::NotFound`] when the weights are missing.
    pub fn load(model_path: &Path, endpoint: &str, timeout: Option<Duration>) -> ModelResult<Self> {
        if !model_path.is_file() {
            return Err(ModelError::NotFound {
                capability: CAPABILITY,
                path: model_path.display().to_string(),
            });
        }

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ModelError::Unavailable {
            capability: CAPABILITY,
            reason: e.to_string(),
        })?;

        info!("Using instruction model {}", model_path.display());
        Ok(Self {
            model_path: model_path.to_path_buf(),
            completion_url: format!("{}/completion", endpoint.trim_end_matches('/')),
            client,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl InstructionModel for LocalInstructionModel {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> ModelResult<String> {
        debug!(
            "Generating up to {} tokens for a {} char prompt",
            params.max_tokens,
            prompt.len()
        );

        let request = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            stop: &params.stop,
        };

        let response = self
            .client
            .post(&self.completion_url)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ModelError::Failed {
                capability: CAPABILITY,
                reason: e.to_string(),
            })?;

        let body: CompletionResponse = response.json().map_err(|e| ModelError::InvalidOutput {
            capability: CAPABILITY,
            reason: e.to_string(),
        })?;

        Ok(body.content)
    }

    fn model_id(&self) -> &str {
        INSTRUCTION_MODEL_ID
    }
}
