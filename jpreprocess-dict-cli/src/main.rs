//! jpreprocess-dict CLI - manage the jpreprocess dictionary cache
//!
//! Downloads, locates and removes the `naist-jdic` dictionary used by
//! jpreprocess, and edits the persisted settings.

mod commands;
mod error;

use std::process;

use clap::{Parser, Subcommand};
use jpreprocess_dict::ResourceRegistry;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::cache::{RemoveArgs, StatusArgs};
use commands::config::ConfigCommands;
use commands::fetch::{FetchArgs, PathArgs};
use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "jpreprocess-dict",
    about = "Download and manage the jpreprocess dictionary",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download a dictionary version unless it is cached, then print its path
    Fetch(FetchArgs),

    /// Print the dictionary path without downloading anything
    Path(PathArgs),

    /// List cached dictionary versions
    Status(StatusArgs),

    /// Delete a cached dictionary version
    Remove(RemoveArgs),

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},reqwest=warn,rustls=warn", default)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Fetch(args) => commands::fetch::run_fetch(args),
        Commands::Path(args) => commands::fetch::run_path(args),
        Commands::Status(args) => commands::cache::run_status(args),
        Commands::Remove(args) => commands::cache::run_remove(args),
        Commands::Config(command) => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = ResourceRegistry::global();
    let guard = registry.shutdown_guard();

    // Temporary dictionaries must not outlive an interrupted download
    let interrupted = std::sync::Arc::clone(&registry);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Interrupted, cleaning up...");
        interrupted.teardown_all();
        process::exit(130);
    }) {
        debug!(error = %e, "Failed to set signal handler");
    }

    let result = run(cli.command);

    // process::exit skips destructors
    drop(guard);

    if let Err(e) = result {
        e.report();
        process::exit(1);
    }
}
