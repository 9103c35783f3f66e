//! Single-command training from YAML configuration

use super::schema::TrainSpec;
use super::validate::{validate_config, validate_paths, ValidationError};
use crate::data::{read_feature_csv, Dataset, PrefetchLoader};
use crate::error::{Error, Result, Stage};
use crate::eval::MetricsReport;
use crate::io::Checkpoint;
use crate::model::{FeatureEncoder, HierarchicalClassifier, LinearEncoder, LineageProjector, PassthroughEncoder};
use crate::optim::{AdamW, Optimizer, SGD};
use crate::taxonomy::{LabelCodec, TaxonomyTree, RANK_COUNT};
use crate::train::{evaluate, TrainConfig, TrainEvalLoop, TrainResult};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Command-line overrides applied on top of a loaded spec
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainOverrides {
    pub epochs: Option<usize>,
    pub lr: Option<f32>,
    pub seed: Option<u64>,
}

impl TrainOverrides {
    pub fn apply(&self, spec: &mut TrainSpec) {
        if let Some(epochs) = self.epochs {
            spec.training.epochs = epochs;
        }
        if let Some(lr) = self.lr {
            spec.optimizer.lr = lr;
        }
        if let Some(seed) = self.seed {
            spec.training.random_seed = seed;
        }
    }
}

/// Read, parse and validate a YAML spec
///
/// Relative paths inside the file are resolved against the file's directory.
pub fn load_spec<P: AsRef<Path>>(config_path: P) -> Result<TrainSpec> {
    let path = config_path.as_ref();
    let yaml = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file {}: {e}", path.display())))?;
    let mut spec: TrainSpec =
        serde_yaml::from_str(&yaml).map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;
    if let Some(base) = path.parent() {
        spec.resolve_paths(base);
    }
    validate_config(&spec)?;
    Ok(spec)
}

impl TrainSpec {
    /// Runtime loop configuration
    pub fn train_config(&self) -> Result<TrainConfig> {
        let t = &self.training;
        let rank_weights: [f32; RANK_COUNT] = t
            .rank_weights
            .as_slice()
            .try_into()
            .map_err(|_| ValidationError::InvalidRankWeightCount(t.rank_weights.len()))?;

        let mut config = TrainConfig::new()
            .with_epochs(t.epochs)
            .with_batch_size(self.data.batch_size)
            .with_learning_rate(self.optimizer.lr)
            .with_min_lr(t.min_lr)
            .with_early_stopping(t.early_stopping_patience, t.min_delta)
            .with_seed(t.random_seed)
            .with_rank_weights(rank_weights)
            .with_consistency_penalty(t.consistency_penalty_coefficient)
            .with_keep_all_checkpoints(t.keep_all_checkpoints)
            .with_log_interval(t.log_interval)
            .with_workers(self.data.workers, self.data.prefetch);
        if let Some(max_norm) = t.max_grad_norm {
            config = config.with_grad_clip(max_norm);
        }
        if let Some(dir) = &t.output_dir {
            config = config.with_output_dir(dir);
        }
        Ok(config)
    }

    pub fn build_optimizer(&self) -> Result<Box<dyn Optimizer>> {
        let o = &self.optimizer;
        match o.name.as_str() {
            "adamw" => Ok(Box::new(AdamW::with_weight_decay(o.lr, o.weight_decay))),
            "sgd" => Ok(Box::new(SGD::new(o.lr, o.momentum))),
            other => Err(ValidationError::InvalidOptimizer(other.to_string()).into()),
        }
    }

    pub fn build_encoder(&self, input_dim: usize) -> Result<Box<dyn FeatureEncoder>> {
        match self.model.encoder.as_str() {
            "linear" => Ok(Box::new(LinearEncoder::new(input_dim, self.model.embed_dim, self.training.random_seed))),
            "passthrough" => Ok(Box::new(PassthroughEncoder::new(input_dim))),
            other => Err(ValidationError::InvalidEncoder(other.to_string()).into()),
        }
    }
}

/// Taxonomy, datasets and factories built from one spec
pub struct Pipeline {
    spec: TrainSpec,
    tree: Arc<TaxonomyTree>,
    train: Arc<Dataset>,
    val: Arc<Dataset>,
}

impl Pipeline {
    /// Load the taxonomy and encode both splits
    pub fn from_spec(spec: TrainSpec) -> Result<Self> {
        validate_paths(&spec)?;
        let tree = TaxonomyTree::from_csv(&spec.taxonomy.path).map_err(|e| e.at_stage(Stage::Construction))?;
        let tree = Arc::new(tree);
        let codec = LabelCodec::new(Arc::clone(&tree));

        let load = |path: &Path| -> Result<Dataset> {
            let raw = read_feature_csv(path).map_err(|e| e.at_stage(Stage::Construction))?;
            Dataset::encode(raw, &codec)
        };
        let train = load(&spec.data.train)?;
        if train.is_empty() {
            return Err(Error::ConfigError(format!("training split {} has no samples", spec.data.train.display()))
                .at_stage(Stage::Construction));
        }
        let val = match &spec.data.val {
            Some(path) => load(path)?,
            None => {
                log::warn!("no validation split configured; best-epoch selection is disabled");
                Dataset::from_samples(Vec::new())?
            }
        };
        if !val.is_empty() && val.input_dim() != train.input_dim() {
            return Err(Error::ShapeMismatch {
                context: "validation feature width".into(),
                expected: train.input_dim(),
                actual: val.input_dim(),
            }
            .at_stage(Stage::Construction));
        }

        log::info!(
            "taxonomy {}: {} species; {} train / {} val samples of width {}",
            spec.taxonomy.path.display(),
            tree.rank_size(crate::taxonomy::Rank::Species),
            train.len(),
            val.len(),
            train.input_dim()
        );
        Ok(Self { spec, tree, train: Arc::new(train), val: Arc::new(val) })
    }

    pub fn spec(&self) -> &TrainSpec {
        &self.spec
    }

    pub fn tree(&self) -> &Arc<TaxonomyTree> {
        &self.tree
    }

    pub fn train_set(&self) -> &Arc<Dataset> {
        &self.train
    }

    pub fn val_set(&self) -> &Arc<Dataset> {
        &self.val
    }

    /// Fresh classifier seeded from `training.random_seed`
    pub fn build_model(&self) -> Result<HierarchicalClassifier> {
        let encoder = self.spec.build_encoder(self.train.input_dim())?;
        let model = HierarchicalClassifier::from_tree(encoder, &self.tree, self.spec.training.random_seed)
            .map_err(|e| e.at_stage(Stage::Construction))?;
        Ok(model.with_activation_budget(self.spec.model.activation_budget))
    }

    /// Shuffled training batches
    pub fn train_loader(&self) -> PrefetchLoader {
        self.loader(&self.train).with_shuffle(self.spec.training.random_seed)
    }

    /// In-order validation batches
    pub fn val_loader(&self) -> PrefetchLoader {
        self.loader(&self.val)
    }

    fn loader(&self, dataset: &Arc<Dataset>) -> PrefetchLoader {
        PrefetchLoader::new(Arc::clone(dataset), self.spec.data.batch_size)
            .with_workers(self.spec.data.workers)
            .with_prefetch(self.spec.data.prefetch)
    }

    pub fn train_loop(&self) -> Result<TrainEvalLoop> {
        TrainEvalLoop::new(
            self.build_model()?,
            self.spec.build_optimizer()?,
            Arc::clone(&self.tree),
            self.spec.train_config()?,
        )
    }

    /// Score a saved checkpoint on the validation split
    ///
    /// With `project`, predictions are replaced by the most likely consistent
    /// lineage. The report is also written to `output_dir` as
    /// `eval_metrics.json` and `eval_rank_accuracy.csv` when configured.
    pub fn evaluate_checkpoint(&self, checkpoint: impl AsRef<Path>, project: bool) -> Result<MetricsReport> {
        let checkpoint = Checkpoint::load(checkpoint).map_err(|e| e.at_stage(Stage::Construction))?;
        let mut model = self.build_model()?;
        checkpoint.restore_into(&mut model).map_err(|e| e.at_stage(Stage::Construction))?;

        let projector = project.then(|| LineageProjector::new(Arc::clone(&self.tree)));
        let outcome = evaluate(&model, &self.val_loader(), &self.tree, None, projector.as_ref())?;
        let report = outcome.metrics.report().with_label_names(&self.tree);

        if let Some(dir) = &self.spec.training.output_dir {
            fs::create_dir_all(dir)?;
            report.save_json(dir.join("eval_metrics.json"))?;
            report.write_rank_accuracy_csv(dir.join("eval_rank_accuracy.csv"))?;
        }
        Ok(report)
    }
}

/// Train a model from a YAML configuration file
///
/// # Example
///
/// ```no_run
/// use linaje::config::{train_from_yaml, TrainOverrides};
///
/// let result = train_from_yaml("config.yaml", TrainOverrides::default())?;
/// println!("best epoch: {:?}", result.best_epoch);
/// # Ok::<(), linaje::Error>(())
/// ```
pub fn train_from_yaml<P: AsRef<Path>>(config_path: P, overrides: TrainOverrides) -> Result<TrainResult> {
    let mut spec = load_spec(config_path)?;
    overrides.apply(&mut spec);
    validate_config(&spec)?;

    let pipeline = Pipeline::from_spec(spec)?;
    let mut train_loop = pipeline.train_loop()?;
    train_loop.run(&pipeline.train_loader(), &pipeline.val_loader())
}
