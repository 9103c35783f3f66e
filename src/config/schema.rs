//! YAML schema definitions for declarative training configuration

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!("expected 'true' or 'false', got '{other}'"))),
        },
    }
}

/// Complete training specification
///
/// ```yaml
/// taxonomy:
///   path: taxonomy.csv
/// data:
///   train: train.csv
///   val: val.csv
///   batch_size: 32
/// model:
///   encoder: linear
///   embed_dim: 64
/// optimizer:
///   name: adamw
///   lr: 0.001
/// training:
///   epochs: 20
///   consistency_penalty_coefficient: 0.1
///   output_dir: runs/exp1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSpec {
    pub taxonomy: TaxonomySpec,
    pub data: DataSpec,
    #[serde(default)]
    pub model: ModelSpec,
    #[serde(default)]
    pub optimizer: OptimSpec,
    #[serde(default)]
    pub training: TrainingSpec,
}

impl TrainSpec {
    /// Make every relative path relative to `base` (the config file's directory)
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.taxonomy.path);
        resolve(&mut self.data.train);
        if let Some(val) = self.data.val.as_mut() {
            resolve(val);
        }
        if let Some(out) = self.training.output_dir.as_mut() {
            resolve(out);
        }
    }
}

/// Taxonomy table location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomySpec {
    /// CSV with one column per rank
    pub path: PathBuf,
}

/// Sample sources and batching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSpec {
    /// Training feature table
    pub train: PathBuf,
    /// Validation feature table; an absent split validates on zero samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<PathBuf>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Background batch-assembly threads (0 = inline)
    #[serde(default)]
    pub workers: usize,
    /// Batches queued per worker
    #[serde(default = "default_prefetch")]
    pub prefetch: usize,
}

/// Encoder choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// `linear` (trainable dense + ReLU) or `passthrough` (inputs are embeddings)
    #[serde(default = "default_encoder")]
    pub encoder: String,
    /// Embedding width of the linear encoder; ignored by passthrough
    #[serde(default = "default_embed_dim")]
    pub embed_dim: usize,
    /// Max activations per forward pass before a batch counts as exhausted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_budget: Option<usize>,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self { encoder: default_encoder(), embed_dim: default_embed_dim(), activation_budget: None }
    }
}

/// Optimizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimSpec {
    /// `adamw` or `sgd`
    #[serde(default = "default_optimizer")]
    pub name: String,
    #[serde(default = "default_lr")]
    pub lr: f32,
    /// AdamW decoupled weight decay
    #[serde(default = "default_weight_decay")]
    pub weight_decay: f32,
    /// SGD momentum
    #[serde(default)]
    pub momentum: f32,
}

impl Default for OptimSpec {
    fn default() -> Self {
        Self { name: default_optimizer(), lr: default_lr(), weight_decay: default_weight_decay(), momentum: 0.0 }
    }
}

/// Loop, loss and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSpec {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_patience")]
    pub early_stopping_patience: usize,
    #[serde(default)]
    pub min_delta: f32,
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    /// One weight per rank, kingdom first
    #[serde(default = "default_rank_weights")]
    pub rank_weights: Vec<f32>,
    /// Weight of the lineage consistency penalty (0 disables it)
    #[serde(default)]
    pub consistency_penalty_coefficient: f32,
    #[serde(default)]
    pub min_lr: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_grad_norm: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub keep_all_checkpoints: bool,
    /// Log every N batches (0 = epoch summaries only)
    #[serde(default)]
    pub log_interval: usize,
}

impl Default for TrainingSpec {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            early_stopping_patience: default_patience(),
            min_delta: 0.0,
            random_seed: default_seed(),
            rank_weights: default_rank_weights(),
            consistency_penalty_coefficient: 0.0,
            min_lr: 0.0,
            max_grad_norm: None,
            output_dir: None,
            keep_all_checkpoints: false,
            log_interval: 0,
        }
    }
}

fn default_batch_size() -> usize {
    32
}

fn default_prefetch() -> usize {
    2
}

fn default_encoder() -> String {
    "linear".to_string()
}

fn default_embed_dim() -> usize {
    64
}

fn default_optimizer() -> String {
    "adamw".to_string()
}

fn default_lr() -> f32 {
    1e-3
}

fn default_weight_decay() -> f32 {
    0.01
}

fn default_epochs() -> usize {
    10
}

fn default_patience() -> usize {
    3
}

fn default_seed() -> u64 {
    42
}

fn default_rank_weights() -> Vec<f32> {
    vec![1.0; crate::taxonomy::RANK_COUNT]
}
