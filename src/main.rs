//! Linaje CLI
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! linaje train config.yaml
//!
//! # Train with overrides and info-level logs
//! linaje train config.yaml --epochs 10 --lr 0.001 -v
//!
//! # Validate config, taxonomy and sample tables
//! linaje validate config.yaml
//!
//! # Per-rank label counts of a taxonomy table
//! linaje taxonomy taxonomy.csv
//!
//! # Score the best checkpoint, projecting onto consistent lineages
//! linaje evaluate config.yaml --checkpoint runs/exp1/checkpoints/checkpoint_best.json --project
//! ```

use clap::Parser;
use linaje::cli::{init_logging, run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
