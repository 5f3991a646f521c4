//! flowpipe - main entry point
//!
//! Parses the command line, loads the configuration store, installs the
//! tracing subscriber, assembles the pipeline from the plugin registry and
//! hands control to the source's run loop. Any fatal error is logged and
//! exits the process with a non-zero status.

use anyhow::{Context, Result};
use clap::Parser;
use flowpipe::logging::{self, LogOptions};
use flowpipe::{ConfigStore, Pipeline, Registry};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for flowpipe
#[derive(Parser, Debug)]
#[command(name = "flowpipe")]
#[command(about = "Plugin-based data pipeline processor")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "FLOWPIPE_CONFIG")]
    config: Option<PathBuf>,

    /// Send logging to stderr in addition to the logfile
    #[arg(short, long)]
    verbose: bool,

    /// Output debug messages (overrides main.loglevel)
    #[arg(short, long)]
    debug: bool,

    /// Override a config option (section.key=value or key=value)
    #[arg(short = 'O', long = "opt", value_name = "OVERRIDE")]
    opt: Vec<String>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        // The log line may be the only visible trace when stderr mirroring
        // is off, and stderr the only one when logging setup itself failed.
        error!("Fatal: {:#}", e);
        eprintln!("flowpipe: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut store = ConfigStore::load(args.config.as_deref());
    store.apply_overrides(&args.opt);

    let level = if args.debug {
        "debug".to_string()
    } else {
        store.get("main", "loglevel")?.to_string()
    };
    let logfile = store.get("main", "logfile")?.to_string();
    logging::init(&LogOptions {
        level: &level,
        logfile: &logfile,
        verbose: args.verbose,
    })
    .context("Failed to configure logging")?;

    info!("Starting flowpipe v{}", env!("CARGO_PKG_VERSION"));

    let registry = Registry::builtin();
    let mut pipeline = Pipeline::from_config(&mut store, &registry, &level)
        .context("Failed to assemble pipeline")?;

    pipeline.run().context("Pipeline terminated")?;
    info!("Input exhausted, shutting down");
    Ok(())
}
