//! Logging infrastructure for PhotoDupe.
//!
//! The crate logs through the `log` facade; the embedding application picks
//! the backend. This module offers an `env_logger`-based initializer for
//! hosts (and tests) that do not bring their own. Levels are determined by
//! (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. The `verbose`/`quiet` arguments
//! 3. Default: info level

use env_logger::Builder;
use log::LevelFilter;
use std::env;

/// Initialize the logging subsystem.
///
/// Call once at startup, before any logging calls are made. `RUST_LOG`
/// takes precedence when set; otherwise `quiet` forces errors-only and
/// `verbose` counts up through debug (1) and trace (2+).
///
/// # Panics
///
/// Panics if called more than once, as `env_logger` can only be installed
/// once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.init();
}

/// Determine the log level from verbosity flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
