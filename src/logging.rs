//! Process-wide logging setup
//!
//! One tracing subscriber for the whole process: a non-ANSI layer appending
//! to the configured logfile, plus an optional stderr mirror for `--verbose`
//! runs. The effective level comes from `main.loglevel` unless `--debug`
//! forces it, and is the same level the orchestrator injects into each
//! plugin's config section.

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging options distilled from config and command line.
#[derive(Debug, Clone)]
pub struct LogOptions<'a> {
    /// Severity name: trace, debug, info, warn or error.
    pub level: &'a str,
    /// Logfile path; empty disables the file layer.
    pub logfile: &'a str,
    /// Mirror log lines to stderr.
    pub verbose: bool,
}

/// Install the global subscriber. Call once, before pipeline assembly.
///
/// An unopenable logfile is fatal; an empty `logfile` value means no file
/// layer at all.
pub fn init(opts: &LogOptions<'_>) -> Result<()> {
    let _: tracing::Level = opts
        .level
        .parse()
        .map_err(|_| Error::Config(format!("unknown log level '{}'", opts.level)))?;
    let filter = EnvFilter::new(opts.level);

    let file_layer = if opts.logfile.is_empty() {
        None
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(opts.logfile)
            .map_err(|e| Error::Config(format!("could not open logfile {}: {}", opts.logfile, e)))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
    };
    let no_logfile = file_layer.is_none();

    let stderr_layer = opts
        .verbose
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    if no_logfile {
        info!("No logfile configured.");
    }
    if opts.verbose {
        info!("Verbose output configured.");
    }
    Ok(())
}
