use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use localscreen_core::config::ModelSettings;
use localscreen_core::traits::Classifier;
use localscreen_core::types::RawScores;

use crate::tokenize::tokenize_batch;

pub const NUM_TYPES: usize = 5;

/// Files that make up a trained artifact directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub weights: PathBuf,
    pub tokenizer: PathBuf,
    pub encoder_config: PathBuf,
    pub training_config: PathBuf,
}

impl ModelPaths {
    pub fn from_settings(settings: &ModelSettings, base_dir: &Path) -> Self {
        Self {
            weights: settings.artifact(base_dir, &settings.weights),
            tokenizer: settings.artifact(base_dir, &settings.tokenizer),
            encoder_config: settings.artifact(base_dir, &settings.encoder_config),
            training_config: settings.artifact(base_dir, &settings.training_config),
        }
    }
}

/// Hyper-parameters recorded next to the weights at training time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrainingConfig {
    #[serde(default)]
    pub encoder: Option<String>,
    #[serde(default)]
    pub max_len: Option<usize>,
    #[serde(default)]
    pub bin_threshold: Option<f32>,
}

impl TrainingConfig {
    /// Read the training config; a missing file yields the empty config.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no training config");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid training config {}", path.display()))
    }
}

/// RoBERTa-family encoder with a binary head and a type head over the
/// `[CLS]` state.
pub struct HierClassifier {
    encoder: XLMRobertaModel,
    bin_head: Linear,
    multi_head: Linear,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
    id: String,
}

impl HierClassifier {
    pub fn load(paths: &ModelPaths, max_len: usize, device: Device) -> Result<Self> {
        let start = Instant::now();
        let tokenizer = Tokenizer::from_file(&paths.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", paths.tokenizer.display(), e))?;
        let config_raw = std::fs::read_to_string(&paths.encoder_config)
            .with_context(|| format!("Failed to read {}", paths.encoder_config.display()))?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_raw)
            .with_context(|| format!("Invalid encoder config {}", paths.encoder_config.display()))?;

        let weights = candle_core::pickle::read_all(&paths.weights)
            .with_context(|| format!("Failed to read weights {}", paths.weights.display()))?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);

        let encoder = XLMRobertaModel::new(&config, vb.pp("enc"))?;
        let bin_head = candle_nn::linear(config.hidden_size, 1, vb.pp("bin_head"))?;
        let multi_head = candle_nn::linear(config.hidden_size, NUM_TYPES, vb.pp("multi_head"))?;

        let id = format!("hier:{}", paths.weights.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default());
        info!(classifier = %id, max_len, elapsed_ms = start.elapsed().as_millis() as u64, "model loaded");
        Ok(Self { encoder, bin_head, multi_head, tokenizer, device, max_len, id })
    }

    fn forward(&self, texts: &[String]) -> Result<Vec<RawScores>> {
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.encoder.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let logit_bin = self.bin_head.forward(&cls)?;
        let logits_multi = self.multi_head.forward(&cls)?;
        heads_to_scores(&logit_bin, &logits_multi)
    }
}

impl Classifier for HierClassifier {
    fn classifier_id(&self) -> &str { &self.id }

    fn num_types(&self) -> usize { NUM_TYPES }

    fn classify_batch(&self, texts: &[String]) -> Result<Vec<RawScores>> {
        let start = Instant::now();
        let scores = self.forward(texts)?;
        debug!(batch = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "forward pass");
        Ok(scores)
    }
}

/// Sigmoid of the `[B, 1]` binary logits and softmax of the `[B, K]` type
/// logits, one [`RawScores`] per row.
pub fn heads_to_scores(logit_bin: &Tensor, logits_multi: &Tensor) -> Result<Vec<RawScores>> {
    let p_bully: Vec<f32> = candle_nn::ops::sigmoid(logit_bin)?
        .to_dtype(DType::F32)?
        .to_device(&Device::Cpu)?
        .flatten_all()?
        .to_vec1()?;
    let type_probs: Vec<Vec<f32>> = candle_nn::ops::softmax(logits_multi, D::Minus1)?
        .to_dtype(DType::F32)?
        .to_device(&Device::Cpu)?
        .to_vec2()?;
    if p_bully.len() != type_probs.len() {
        return Err(anyhow!("head batch mismatch: {} binary vs {} type rows", p_bully.len(), type_probs.len()));
    }
    Ok(p_bully.into_iter().zip(type_probs).map(|(p_bully, type_probs)| RawScores { p_bully, type_probs }).collect())
}
