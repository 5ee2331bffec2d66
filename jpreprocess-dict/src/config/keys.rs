//! Typed keys for getting and setting config file values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use super::file::ConfigFile;

/// Errors from parsing or setting a config key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigKeyError {
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// A settable configuration key, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DictionaryVersion,
    DictionaryBaseDir,
    DictionaryReleaseUrl,
    DictionaryTimeoutSecs,
}

impl ConfigKey {
    /// All keys, in display order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::DictionaryVersion,
            Self::DictionaryBaseDir,
            Self::DictionaryReleaseUrl,
            Self::DictionaryTimeoutSecs,
        ]
    }

    /// Full name, e.g. `dictionary.version`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DictionaryVersion => "dictionary.version",
            Self::DictionaryBaseDir => "dictionary.base_dir",
            Self::DictionaryReleaseUrl => "dictionary.release_url",
            Self::DictionaryTimeoutSecs => "dictionary.timeout_secs",
        }
    }

    pub fn section(&self) -> &'static str {
        self.name().split_once('.').map(|(s, _)| s).unwrap_or_default()
    }

    pub fn key_name(&self) -> &'static str {
        self.name().split_once('.').map(|(_, k)| k).unwrap_or_default()
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let settings = &config.dictionary;
        match self {
            Self::DictionaryVersion => settings.version.clone().unwrap_or_default(),
            Self::DictionaryBaseDir => settings
                .base_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            Self::DictionaryReleaseUrl => settings.release_url.clone().unwrap_or_default(),
            Self::DictionaryTimeoutSecs => settings
                .timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_default(),
        }
    }

    /// Set the value. An empty string unsets the key.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        let settings = &mut config.dictionary;
        let set = !value.is_empty();

        match self {
            Self::DictionaryVersion => {
                settings.version = set.then(|| value.to_string());
            }
            Self::DictionaryBaseDir => {
                let path = PathBuf::from(value);
                if set && !path.is_absolute() {
                    return Err(ConfigKeyError::InvalidValue {
                        key: self.name().to_string(),
                        reason: "base directory must be an absolute path".to_string(),
                    });
                }
                settings.base_dir = set.then_some(path);
            }
            Self::DictionaryReleaseUrl => {
                let scheme_ok = ["http://", "https://", "file://"]
                    .iter()
                    .any(|scheme| value.starts_with(scheme));
                if set && !scheme_ok {
                    return Err(ConfigKeyError::InvalidValue {
                        key: self.name().to_string(),
                        reason: "release URL must start with http://, https:// or file://".to_string(),
                    });
                }
                settings.release_url = set.then(|| value.to_string());
            }
            Self::DictionaryTimeoutSecs => {
                settings.timeout_secs = if set {
                    Some(value.parse().map_err(|_| ConfigKeyError::InvalidValue {
                        key: self.name().to_string(),
                        reason: format!("'{}' is not a whole number of seconds", value),
                    })?)
                } else {
                    None
                };
            }
        }

        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}
