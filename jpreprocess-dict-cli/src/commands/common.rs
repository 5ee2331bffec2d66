//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use jpreprocess_dict::config::{ConfigFile, DictionarySettings};
use jpreprocess_dict::fetch::{BarProgress, NoProgress, ProgressSink};
use jpreprocess_dict::version::ARCHIVE_NAME;
use jpreprocess_dict::{DictionaryConfig, DictionaryManager, DictionaryVersion, PackageBase};
use tracing::warn;

use crate::error::CliError;

/// Options selecting a dictionary and where it is cached.
#[derive(Debug, Clone, Default, Args)]
pub struct DictionaryArgs {
    /// Dictionary version: a release tag such as v0.8.1, or "latest"
    #[arg(long = "version", value_name = "VERSION")]
    pub dict_version: Option<String>,

    /// Directory holding one subdirectory per cached version
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

/// Load the config file, falling back to defaults when it cannot be read.
pub fn load_config_file() -> ConfigFile {
    ConfigFile::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        ConfigFile::default()
    })
}

/// Version to use: command line first, then config file, then "latest".
pub fn resolve_version(args: &DictionaryArgs, settings: &DictionarySettings) -> DictionaryVersion {
    args.dict_version
        .as_deref()
        .or(settings.version.as_deref())
        .filter(|v| !v.is_empty())
        .map(DictionaryVersion::new)
        .unwrap_or_default()
}

/// Layer config file, environment and command line, in that order.
pub fn resolve_config(args: &DictionaryArgs, settings: &DictionarySettings) -> DictionaryConfig {
    let config = DictionaryConfig::default()
        .with_settings(settings)
        .with_env_overrides();

    match &args.base_dir {
        Some(dir) => config.with_base(PackageBase::Persistent(dir.clone())),
        None => config,
    }
}

/// Progress display for downloads: a bar on an interactive stderr, else nothing.
pub fn progress_sink(show_progress: bool) -> Box<dyn ProgressSink> {
    if show_progress && atty::is(atty::Stream::Stderr) {
        Box::new(BarProgress::new(ARCHIVE_NAME))
    } else {
        Box::new(NoProgress)
    }
}

/// Build a manager for the given options.
pub fn build_manager(
    args: &DictionaryArgs,
    settings: &DictionarySettings,
    show_progress: bool,
) -> Result<DictionaryManager, CliError> {
    let config = resolve_config(args, settings);
    let manager = DictionaryManager::new(config)?;
    Ok(manager.with_progress(progress_sink(show_progress)))
}
