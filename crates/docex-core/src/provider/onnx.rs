//! Transformer encoders exported to ONNX: token classification for entity
//! tagging and span prediction for extractive question answering.

use std::path::Path;
use std::sync::Arc;

use docex_inference::{InferenceBackend, InputTensor, OrtBackend, OutputTensor};
use serde_json::Value;
use tokenizers::{Encoding, Tokenizer, TruncationParams, TruncationStrategy};
use tracing::debug;

use super::{Answer, EntityTagger, ModelResult, QuestionAnswerer};
use crate::error::{Capability, ModelError};
use crate::models::record::TaggedEntity;

/// Encoder context length.
const MAX_SEQUENCE_TOKENS: usize = 512;

/// Longest answer span considered, in tokens.
const MAX_ANSWER_TOKENS: usize = 30;

/// Label emitted for tokens outside any entity.
const OUTSIDE_LABEL: &str = "O";

/// Named entity tagger over a token classification model.
pub struct OnnxEntityTagger {
    backend: Arc<dyn InferenceBackend>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

impl OnnxEntityTagger {
    /// Load the model, tokenizer and label map from disk.
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        labels_path: &Path,
        threads: usize,
    ) -> ModelResult<Self> {
        let capability = Capability::EntityTagging;
        require_file(capability, model_path)?;
        require_file(capability, tokenizer_path)?;
        require_file(capability, labels_path)?;

        let labels = std::fs::read_to_string(labels_path)
            .map_err(|e| unavailable(capability, e))
            .and_then(|content| parse_labels(&content))?;
        let tokenizer = load_tokenizer(capability, tokenizer_path, TruncationStrategy::LongestFirst)?;
        let backend = OrtBackend::from_file(model_path, threads).map_err(|e| unavailable(capability, e))?;

        debug!("Entity tagger ready with {} labels", labels.len());
        Ok(Self::new(Arc::new(backend), tokenizer, labels))
    }

    pub fn new(backend: Arc<dyn InferenceBackend>, tokenizer: Tokenizer, labels: Vec<String>) -> Self {
        Self {
            backend,
            tokenizer,
            labels,
        }
    }
}

impl EntityTagger for OnnxEntityTagger {
    fn tag(&self, text: &str) -> ModelResult<Vec<TaggedEntity>> {
        let capability = Capability::EntityTagging;
        let encoding = self
            .tokenizer
            .encode_char_offsets(text, true)
            .map_err(|e| failed(capability, e))?;

        let outputs = self
            .backend
            .run(&encoder_inputs(&encoding).map_err(|e| failed(capability, e))?)
            .map_err(|e| failed(capability, e))?;
        let logits = self
            .backend
            .select_output(&outputs, "logits", 0)
            .ok_or_else(|| invalid(capability, "missing logits output"))?;

        let tokens = encoding.len();
        let scores = float_rows(logits, tokens).map_err(|reason| invalid(capability, reason))?;

        let mut entities = Vec::new();
        for (index, row) in scores.iter().enumerate() {
            if encoding.get_special_tokens_mask()[index] == 1 {
                continue;
            }
            let probabilities = softmax(row);
            let Some((label_id, score)) = argmax(&probabilities) else {
                continue;
            };
            let label = self
                .labels
                .get(label_id)
                .ok_or_else(|| invalid(capability, format!("label id {} out of range", label_id)))?;
            if label == OUTSIDE_LABEL {
                continue;
            }

            let (start, end) = encoding.get_offsets()[index];
            entities.push(TaggedEntity {
                entity: label.clone(),
                score: f64::from(score),
                index,
                word: encoding.get_tokens()[index].clone(),
                start,
                end,
            });
        }
        Ok(entities)
    }
}

/// Extractive question answering over a span prediction model.
pub struct OnnxQuestionAnswerer {
    backend: Arc<dyn InferenceBackend>,
    tokenizer: Tokenizer,
}

impl OnnxQuestionAnswerer {
    pub fn load(model_path: &Path, tokenizer_path: &Path, threads: usize) -> ModelResult<Self> {
        let capability = Capability::QuestionAnswering;
        require_file(capability, model_path)?;
        require_file(capability, tokenizer_path)?;

        // Long documents keep the question and lose the context tail.
        let tokenizer = load_tokenizer(capability, tokenizer_path, TruncationStrategy::OnlySecond)?;
        let backend = OrtBackend::from_file(model_path, threads).map_err(|e| unavailable(capability, e))?;
        Ok(Self::new(Arc::new(backend), tokenizer))
    }

    pub fn new(backend: Arc<dyn InferenceBackend>, tokenizer: Tokenizer) -> Self {
        Self { backend, tokenizer }
    }
}

impl QuestionAnswerer for OnnxQuestionAnswerer {
    fn answer(&self, context: &str, question: &str) -> ModelResult<Answer> {
        let capability = Capability::QuestionAnswering;
        let encoding = self
            .tokenizer
            .encode_char_offsets((question, context), true)
            .map_err(|e| failed(capability, e))?;

        let outputs = self
            .backend
            .run(&encoder_inputs(&encoding).map_err(|e| failed(capability, e))?)
            .map_err(|e| failed(capability, e))?;
        let start_logits = self
            .backend
            .select_output(&outputs, "start_logits", 0)
            .and_then(OutputTensor::as_f32)
            .ok_or_else(|| invalid(capability, "missing start_logits output"))?;
        let end_logits = self
            .backend
            .select_output(&outputs, "end_logits", 1)
            .and_then(OutputTensor::as_f32)
            .ok_or_else(|| invalid(capability, "missing end_logits output"))?;

        let context_tokens: Vec<bool> = encoding
            .get_sequence_ids()
            .iter()
            .map(|id| *id == Some(1))
            .collect();

        let start_scores = masked_softmax(start_logits.iter().copied(), &context_tokens);
        let end_scores = masked_softmax(end_logits.iter().copied(), &context_tokens);

        let (start, end, score) = best_span(&start_scores, &end_scores, MAX_ANSWER_TOKENS)
            .ok_or_else(|| invalid(capability, "no answer span in context"))?;

        let offsets = encoding.get_offsets();
        let text: String = context
            .chars()
            .skip(offsets[start].0)
            .take(offsets[end].1.saturating_sub(offsets[start].0))
            .collect();

        Ok(Answer {
            text: text.trim().to_string(),
            score: f64::from(score),
        })
    }
}

fn encoder_inputs(encoding: &Encoding) -> docex_inference::Result<Vec<(&'static str, InputTensor)>> {
    Ok(vec![
        ("input_ids", InputTensor::row_i64(encoding.get_ids())?),
        ("attention_mask", InputTensor::row_i64(encoding.get_attention_mask())?),
        ("token_type_ids", InputTensor::row_i64(encoding.get_type_ids())?),
    ])
}

fn load_tokenizer(
    capability: Capability,
    path: &Path,
    strategy: TruncationStrategy,
) -> ModelResult<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| unavailable(capability, e))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQUENCE_TOKENS,
            strategy,
            ..Default::default()
        }))
        .map_err(|e| unavailable(capability, e))?;
    Ok(tokenizer)
}

/// Accepts `{"id2label": {"0": "O", ...}}`, a bare `{"0": "O"}` map, or a
/// JSON array of labels.
fn parse_labels(content: &str) -> ModelResult<Vec<String>> {
    let capability = Capability::EntityTagging;
    let value: Value = serde_json::from_str(content).map_err(|e| unavailable(capability, e))?;
    let value = value.get("id2label").cloned().unwrap_or(value);

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(unavailable(capability, format!("bad label {}", other))),
            })
            .collect(),
        Value::Object(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (id, label) in map {
                let id: usize = id
                    .parse()
                    .map_err(|_| unavailable(capability, format!("bad label id '{}'", id)))?;
                let label = label
                    .as_str()
                    .ok_or_else(|| unavailable(capability, format!("bad label for id {}", id)))?;
                pairs.push((id, label.to_string()));
            }
            pairs.sort_by_key(|(id, _)| *id);
            if pairs.iter().enumerate().any(|(i, (id, _))| i != *id) {
                return Err(unavailable(capability, "label ids are not contiguous"));
            }
            Ok(pairs.into_iter().map(|(_, label)| label).collect())
        }
        _ => Err(unavailable(capability, "unsupported label map")),
    }
}

/// Split a `[1, tokens, labels]` logits tensor into per-token rows.
fn float_rows(output: &OutputTensor, tokens: usize) -> Result<Vec<Vec<f32>>, String> {
    let logits = output.as_f32().ok_or("logits are not f32")?;
    let shape = logits.shape();
    if shape.len() != 3 || shape[1] != tokens || shape[2] == 0 {
        return Err(format!("unexpected logits shape {:?}", shape));
    }
    let values: Vec<f32> = logits.iter().copied().collect();
    Ok(values.chunks(shape[2]).map(<[f32]>::to_vec).collect())
}

fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Softmax over the positions where `keep` is true; the rest score zero.
fn masked_softmax(values: impl Iterator<Item = f32>, keep: &[bool]) -> Vec<f32> {
    let masked: Vec<f32> = values
        .zip(keep)
        .map(|(v, &k)| if k { v } else { f32::NEG_INFINITY })
        .collect();
    if !keep.iter().any(|&k| k) {
        return vec![0.0; masked.len()];
    }
    softmax(&masked)
}

fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Highest `start * end` probability span with `start <= end` and at most
/// `max_len` tokens.
fn best_span(start: &[f32], end: &[f32], max_len: usize) -> Option<(usize, usize, f32)> {
    let mut best: Option<(usize, usize, f32)> = None;
    for (s, &ps) in start.iter().enumerate() {
        if ps <= 0.0 {
            continue;
        }
        for (e, &pe) in end.iter().enumerate().skip(s).take(max_len) {
            let score = ps * pe;
            if score > 0.0 && best.is_none_or(|(_, _, b)| score > b) {
                best = Some((s, e, score));
            }
        }
    }
    best
}

fn require_file(capability: Capability, path: &Path) -> ModelResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ModelError::NotFound {
            capability,
            path: path.display().to_string(),
        })
    }
}

fn unavailable(capability: Capability, reason: impl ToString) -> ModelError {
    ModelError::Unavailable {
        capability,
        reason: reason.to_string(),
    }
}

fn failed(capability: Capability, reason: impl ToString) -> ModelError {
    ModelError::Failed {
        capability,
        reason: reason.to_string(),
    }
}

fn invalid(capability: Capability, reason: impl ToString) -> ModelError {
    ModelError::InvalidOutput {
        capability,
        reason: reason.to_string(),
    }
}
