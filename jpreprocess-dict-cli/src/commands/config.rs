//! `jpreprocess-dict config`: read and edit the persisted dictionary settings.
//!
//! Settings live in an INI file; see `jpreprocess_dict::config::ConfigKey` for
//! the keys and their validation.

use clap::Subcommand;
use jpreprocess_dict::config::{config_file_path, ConfigFile, ConfigKey};

use super::common::load_config_file;
use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting, or "(not set)"
    Get {
        /// Setting name, for example dictionary.version
        key: String,
    },

    /// Store a setting; an empty value removes it
    Set {
        /// Setting name, for example dictionary.base_dir
        key: String,

        /// New value, checked before it is written
        value: String,
    },

    /// Print every known setting with its current value
    List,

    /// Print where the settings file is read from
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'jpreprocess-dict config list' to see available keys.",
            key
        ))
    })
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let value = config_key.get(&load_config_file());

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = load_config_file();
    config_key
        .set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save()?;

    if value.is_empty() {
        println!("Unset {}", config_key.name());
    } else {
        println!("Set {} = {}", config_key.name(), value);
    }
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    print!("{}", render_settings(&load_config_file()));
    Ok(())
}

/// One `name = value` line per key, names padded to a common width.
fn render_settings(config: &ConfigFile) -> String {
    let width = ConfigKey::all()
        .iter()
        .map(|key| key.name().len())
        .max()
        .unwrap_or(0);

    ConfigKey::all()
        .iter()
        .map(|key| {
            let value = key.get(config);
            let shown = if value.is_empty() { "(not set)" } else { value.as_str() };
            format!("{:<width$} = {}\n", key.name(), shown, width = width)
        })
        .collect()
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}
