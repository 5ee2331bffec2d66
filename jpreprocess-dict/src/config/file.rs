//! INI configuration file.
//!
//! ```ini
//! [dictionary]
//! version = v0.8.1
//! base_dir = /srv/jpreprocess
//! release_url = https://github.com/jpreprocess/jpreprocess/releases
//! timeout_secs = 300
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::{DictionaryError, DictionaryResult};

const SECTION_DICTIONARY: &str = "dictionary";

/// Location of the config file: `<config_dir>/jpreprocess/config.ini`.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jpreprocess")
        .join("config.ini")
}

/// Values of the `[dictionary]` section. Unset keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionarySettings {
    /// Version fetched when none is given on the command line.
    pub version: Option<String>,
    /// Package base directory.
    pub base_dir: Option<PathBuf>,
    /// Release area URL.
    pub release_url: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub dictionary: DictionarySettings,
}

impl ConfigFile {
    /// Load from the default location. A missing file yields the defaults.
    pub fn load() -> DictionaryResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> DictionaryResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| {
            DictionaryError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let mut config = Self::default();
        if let Some(section) = ini.section(Some(SECTION_DICTIONARY)) {
            let non_empty = |key: &str| {
                section
                    .get(key)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            config.dictionary.version = non_empty("version");
            config.dictionary.base_dir = non_empty("base_dir").map(PathBuf::from);
            config.dictionary.release_url = non_empty("release_url");
            config.dictionary.timeout_secs = match non_empty("timeout_secs") {
                Some(v) => Some(v.parse().map_err(|_| {
                    DictionaryError::Config(format!(
                        "timeout_secs in {} must be a whole number of seconds, got '{}'",
                        path.display(),
                        v
                    ))
                })?),
                None => None,
            };
        }

        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> DictionaryResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> DictionaryResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DictionaryError::io(parent, e))?;
        }

        let mut ini = Ini::new();
        {
            let mut section = ini.with_section(Some(SECTION_DICTIONARY));
            let settings = &self.dictionary;
            if let Some(v) = &settings.version {
                section.set("version", v.as_str());
            }
            if let Some(v) = &settings.base_dir {
                section.set("base_dir", v.to_string_lossy().into_owned());
            }
            if let Some(v) = &settings.release_url {
                section.set("release_url", v.as_str());
            }
            if let Some(v) = settings.timeout_secs {
                section.set("timeout_secs", v.to_string());
            }
        }

        ini.write_to_file(path)
            .map_err(|e| DictionaryError::io(path, e))
    }
}
