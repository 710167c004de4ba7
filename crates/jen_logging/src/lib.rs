#![deny(missing_docs)]
//! Shared logging utilities for the jen workspace.
//!
//! Library crates log through the `jen_*` macros so the backend can be
//! swapped in one place. The binary decides where the output goes.

use log::LevelFilter;

/// Environment variable that switches the command-line tool to debug output.
pub const DEBUG_ENV_VAR: &str = "DEBUG_JEN";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! jen_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! jen_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! jen_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! jen_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! jen_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Picks the log level for the command-line tool.
///
/// Any non-empty value of [`DEBUG_ENV_VAR`] enables debug output; otherwise
/// only warnings and errors are shown so they do not interleave with console
/// text.
pub fn level_from_env() -> LevelFilter {
    match std::env::var(DEBUG_ENV_VAR) {
        Ok(value) if !value.is_empty() => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}
