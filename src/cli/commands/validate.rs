//! Validate command implementation

use crate::cli::ValidateArgs;
use crate::config::{load_spec, Pipeline, TrainSpec};
use crate::Result;

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let spec = load_spec(&args.config)?;
    println!("{}", format_spec(&spec));

    let pipeline = Pipeline::from_spec(spec)?;
    println!(
        "Config valid: {} train / {} val samples, {} species",
        pipeline.train_set().len(),
        pipeline.val_set().len(),
        pipeline.tree().rank_size(crate::taxonomy::Rank::Species)
    );
    Ok(())
}

/// Human-readable view of a spec
pub fn format_spec(spec: &TrainSpec) -> String {
    let mut lines = vec![
        format!("  Taxonomy: {}", spec.taxonomy.path.display()),
        format!("  Training data: {}", spec.data.train.display()),
    ];
    if let Some(val) = &spec.data.val {
        lines.push(format!("  Validation data: {}", val.display()));
    }
    lines.push(format!("  Batch size: {} (workers {})", spec.data.batch_size, spec.data.workers));
    lines.push(format!("  Encoder: {} (embed_dim {})", spec.model.encoder, spec.model.embed_dim));
    lines.push(format!("  Optimizer: {} (lr={})", spec.optimizer.name, spec.optimizer.lr));
    lines.push(format!("  Epochs: {} (patience {})", spec.training.epochs, spec.training.early_stopping_patience));
    lines.push(format!("  Rank weights: {:?}", spec.training.rank_weights));
    lines.push(format!("  Consistency penalty: {}", spec.training.consistency_penalty_coefficient));
    if let Some(dir) = &spec.training.output_dir {
        lines.push(format!("  Output dir: {}", dir.display()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_spec() {
        let spec: TrainSpec =
            serde_yaml::from_str("taxonomy:\n  path: t.csv\ndata:\n  train: a.csv\ntraining:\n  consistency_penalty_coefficient: 0.5\n")
                .unwrap();
        let text = format_spec(&spec);
        assert!(text.contains("t.csv"));
        assert!(text.contains("adamw"));
        assert!(text.contains("Consistency penalty: 0.5"));
        assert!(!text.contains("Validation data"));
    }
}
