//! Evaluate command implementation

use crate::cli::EvaluateArgs;
use crate::config::{load_spec, Pipeline};
use crate::Result;

pub fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let spec = load_spec(&args.config)?;
    let pipeline = Pipeline::from_spec(spec)?;
    let report = pipeline.evaluate_checkpoint(&args.checkpoint, args.project)?;

    let mode = if args.project { "projected lineages" } else { "per-rank argmax" };
    println!("Checkpoint {} ({mode})", args.checkpoint.display());
    println!("{}", super::format_report(&report));
    Ok(())
}
