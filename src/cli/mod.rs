//! CLI module for linaje
//!
//! Argument parsing, logger setup and the command handlers behind the
//! `linaje` binary.

mod args;
mod commands;
mod logging;

pub use args::{Cli, Command, EvaluateArgs, TaxonomyArgs, TrainArgs, ValidateArgs};
pub use commands::run_command;
pub use logging::{init_logging, level_filter};
