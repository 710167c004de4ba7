//! Logging initialization for the `jen` binary.
//!
//! Terminal output goes to stderr so it never mixes with console text written
//! to stdout. `--log-file` additionally writes `./jen.log`.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE_PATH: &str = "./jen.log";

/// Destination for log output.
pub enum LogDestination {
    /// Write to stderr.
    Terminal,
    /// Write to stderr and ./jen.log.
    Both,
}

/// Initialize the logger. The level follows `DEBUG_JEN`.
pub fn initialize(destination: LogDestination) {
    let level = jen_logging::level_from_env();
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let LogDestination::Both = destination {
        if let Some(file_logger) = create_file_logger(LevelFilter::Debug, config) {
            loggers.push(file_logger);
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(level: LevelFilter, config: Config) -> Option<Box<WriteLogger<File>>> {
    let log_path = Path::new(LOG_FILE_PATH);
    File::create(log_path)
        .map(|file| WriteLogger::new(level, config, file))
        .inspect_err(|err| eprintln!("jen: cannot write {}: {err}", log_path.display()))
        .ok()
}
