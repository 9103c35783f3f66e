//! Logger setup for the CLI

use log::LevelFilter;
use std::io::Write;

/// Level selected by `-q` / `-v` repetitions
pub fn level_filter(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Install `env_logger` on stderr; `RUST_LOG` still wins when set
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = level_filter(verbose, quiet).to_string().to_lowercase();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level))
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
        .target(env_logger::Target::Stderr)
        .try_init();
}
