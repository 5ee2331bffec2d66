//! Configuration for dictionary acquisition.
//!
//! [`DictionaryConfig`] is the programmatic configuration consumed by the
//! resolver and the acquisition manager. [`ConfigFile`] is the persisted INI
//! form used by the command-line tool.

mod file;
mod keys;

pub use file::{config_file_path, ConfigFile, DictionarySettings};
pub use keys::{ConfigKey, ConfigKeyError};

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DictionaryError, DictionaryResult};
use crate::version::DEFAULT_RELEASE_BASE_URL;

/// Overrides the dictionary path for every version; no download takes place.
pub const ENV_DICT_PATH: &str = "JPREPROCESS_DICT_PATH";

/// Overrides the package base directory that version directories live under.
pub const ENV_DICT_DIR: &str = "JPREPROCESS_DICT_DIR";

/// Overrides the release area archive URLs are built from.
pub const ENV_DICT_URL: &str = "JPREPROCESS_DICT_URL";

/// Package name used for the data directory and resource keys.
pub const DEFAULT_PACKAGE: &str = "jpreprocess";

/// Where version directories are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageBase {
    /// A persistent directory shared across runs.
    Persistent(PathBuf),
    /// No persistent location: each (package, version) is materialized in a
    /// per-process temporary directory released at exit.
    Ephemeral,
}

impl PackageBase {
    /// The platform data directory (`~/.local/share/jpreprocess` on Linux),
    /// falling back to an ephemeral location when none exists.
    pub fn default_location(package: &str) -> Self {
        dirs::data_dir()
            .map(|dir| Self::Persistent(dir.join(package)))
            .unwrap_or(Self::Ephemeral)
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Ephemeral)
    }
}

/// Configuration for dictionary resolution and download.
#[derive(Debug, Clone)]
pub struct DictionaryConfig {
    /// Package name, used for the default data directory and resource keys.
    pub package: String,

    /// Location of the per-version dictionary directories.
    pub base: PackageBase,

    /// Release area archive URLs are templated from.
    pub release_base_url: String,

    /// HTTP timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            base: PackageBase::default_location(DEFAULT_PACKAGE),
            release_base_url: DEFAULT_RELEASE_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl DictionaryConfig {
    /// Create a configuration storing dictionaries under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base: PackageBase::Persistent(base_dir.into()),
            ..Default::default()
        }
    }

    /// Default configuration adjusted by `JPREPROCESS_DICT_DIR` and
    /// `JPREPROCESS_DICT_URL`. Empty variables are ignored.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `JPREPROCESS_DICT_DIR` and `JPREPROCESS_DICT_URL` on top of this
    /// configuration. Empty variables are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = env::var_os(ENV_DICT_DIR).filter(|v| !v.is_empty()) {
            self.base = PackageBase::Persistent(PathBuf::from(dir));
        }
        if let Some(url) = env::var(ENV_DICT_URL).ok().filter(|v| !v.is_empty()) {
            self.release_base_url = url;
        }
        self
    }

    /// Apply the values set in a config file on top of this configuration.
    pub fn with_settings(mut self, settings: &DictionarySettings) -> Self {
        if let Some(dir) = &settings.base_dir {
            self.base = PackageBase::Persistent(dir.clone());
        }
        if let Some(url) = &settings.release_url {
            self.release_base_url = url.clone();
        }
        if let Some(secs) = settings.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        self
    }

    /// Set the package base.
    pub fn with_base(mut self, base: PackageBase) -> Self {
        self.base = base;
        self
    }

    /// Set the release area URL.
    pub fn with_release_base_url(mut self, url: impl Into<String>) -> Self {
        self.release_base_url = url.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the package name.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }
}

/// Read the `JPREPROCESS_DICT_PATH` override. Empty values count as unset.
///
/// A value that is not valid UTF-8 cannot be handed to the engine and is
/// reported as a resolution error.
pub fn env_dict_path() -> DictionaryResult<Option<String>> {
    match env::var(ENV_DICT_PATH) {
        Ok(v) if v.is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(raw)) => Err(DictionaryError::Resolution {
            path: PathBuf::from(raw),
            reason: format!("{} is not valid UTF-8", ENV_DICT_PATH),
        }),
    }
}
