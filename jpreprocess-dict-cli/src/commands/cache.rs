//! `status` and `remove` commands for the local dictionary cache.

use clap::Args;
use jpreprocess_dict::{CachedDictionary, PackageBase};
use serde_json::json;

use super::common::{build_manager, load_config_file, DictionaryArgs};
use crate::error::CliError;

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub dictionary: DictionaryArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the remove command.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub dictionary: DictionaryArgs,
}

/// List cached dictionary versions.
pub fn run_status(args: StatusArgs) -> Result<(), CliError> {
    let config_file = load_config_file();
    let manager = build_manager(&args.dictionary, &config_file.dictionary, false)?;
    let config = manager.config();
    let cached = manager.cached_versions()?;

    let base = match &config.base {
        PackageBase::Persistent(dir) => Some(dir.display().to_string()),
        PackageBase::Ephemeral => None,
    };

    if args.json {
        let output = json!({
            "base_dir": base,
            "release_url": config.release_base_url,
            "cached": cached,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Dictionary Cache");
    println!("================");
    println!();
    println!(
        "Location:    {}",
        base.as_deref().unwrap_or("(temporary, removed at exit)")
    );
    println!("Release URL: {}", config.release_base_url);
    println!();

    if cached.is_empty() {
        println!("No dictionaries cached.");
    } else {
        print_cached(&cached);
    }

    Ok(())
}

fn print_cached(cached: &[CachedDictionary]) {
    let width = cached.iter().map(|c| c.version.len()).max().unwrap_or(0);
    for entry in cached {
        println!("  {:<width$}  {}", entry.version, entry.path.display(), width = width);
    }
}

/// Delete one cached version.
pub fn run_remove(args: RemoveArgs) -> Result<(), CliError> {
    let version = args.dictionary.dict_version.clone().ok_or_else(|| {
        CliError::Config("remove requires --version to name the dictionary to delete".to_string())
    })?;

    let config_file = load_config_file();
    let manager = build_manager(&args.dictionary, &config_file.dictionary, false)?;

    if manager.remove(&version.as_str().into())? {
        println!("Removed {}", version);
    } else {
        println!("{} is not cached", version);
    }

    Ok(())
}
