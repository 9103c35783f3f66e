//! Train command implementation

use crate::cli::TrainArgs;
use crate::config::{load_spec, validate_config, Pipeline, TrainOverrides};
use crate::train::TrainResult;
use crate::Result;
use std::sync::atomic::Ordering;

pub fn run_train(args: TrainArgs) -> Result<()> {
    log::info!("training from {}", args.config.display());

    let mut spec = load_spec(&args.config)?;
    TrainOverrides { epochs: args.epochs, lr: args.lr, seed: args.seed }.apply(&mut spec);
    validate_config(&spec)?;

    let pipeline = Pipeline::from_spec(spec)?;
    let mut train_loop = pipeline.train_loop()?;

    let stop = train_loop.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nInterrupted, stopping after the current epoch");
        stop.store(true, Ordering::SeqCst);
    }) {
        log::warn!("could not install Ctrl-C handler: {e}");
    }

    let result = train_loop.run(&pipeline.train_loader(), &pipeline.val_loader())?;
    println!("{}", format_result(&result));
    if let Some(report) = train_loop.report() {
        println!("{}", super::format_report(report));
    }
    Ok(())
}

/// Summary of a finished run
pub fn format_result(result: &TrainResult) -> String {
    let mut lines = vec![format!("Training {} after {} epochs ({:.1}s)", result.state, result.epochs_run, result.elapsed_secs)];
    match (result.best_epoch, result.best_score) {
        (Some(epoch), Some(score)) => {
            lines.push(format!("  Best epoch: {epoch} (val hierarchical accuracy {score:.4})"));
        }
        _ => lines.push("  No validation improvement recorded".to_string()),
    }
    lines.push(format!("  Final train loss: {:.4}", result.final_train_loss));
    if let Some(best) = result.checkpoints.last() {
        lines.push(format!("  Best checkpoint: {}", best.path.display()));
    }
    lines.join("\n")
}
