//! `fetch` and `path` commands.

use clap::Args;
use jpreprocess_dict::config::env_dict_path;
use jpreprocess_dict::AcquireOutcome;
use tracing::info;

use super::common::{build_manager, load_config_file, resolve_version, DictionaryArgs};
use crate::error::CliError;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub dictionary: DictionaryArgs,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the path command.
#[derive(Debug, Args)]
pub struct PathArgs {
    #[command(flatten)]
    pub dictionary: DictionaryArgs,
}

/// Make sure the dictionary is present and print its path.
pub fn run_fetch(args: FetchArgs) -> Result<(), CliError> {
    let config_file = load_config_file();
    let version = resolve_version(&args.dictionary, &config_file.dictionary);
    let manager = build_manager(&args.dictionary, &config_file.dictionary, !args.no_progress)?;

    let env_override = env_dict_path()?;
    let acquisition = manager.acquire_with_outcome(&version, env_override.as_deref())?;

    match acquisition.outcome {
        AcquireOutcome::Override => {
            info!(path = %acquisition.path, "Using JPREPROCESS_DICT_PATH, nothing downloaded");
        }
        AcquireOutcome::CacheHit => {
            info!(version = %version, "Dictionary already cached");
        }
        AcquireOutcome::Downloaded { bytes, files } => {
            info!(version = %version, bytes, files, "Dictionary downloaded");
        }
    }

    println!("{}", acquisition.path);
    Ok(())
}

/// Print where the dictionary lives (or would live) without downloading.
pub fn run_path(args: PathArgs) -> Result<(), CliError> {
    let config_file = load_config_file();
    let version = resolve_version(&args.dictionary, &config_file.dictionary);
    let manager = build_manager(&args.dictionary, &config_file.dictionary, false)?;

    let path = manager.resolver().resolve_from_env(&version)?;
    println!("{}", path);

    if !path.exists() {
        info!(version = %version, "Dictionary is not cached; run 'jpreprocess-dict fetch' to download it");
    }
    Ok(())
}
