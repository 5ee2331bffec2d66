//! User dictionaries passed to the engine alongside the system dictionary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DictionaryError, DictionaryResult};

/// Format of a user dictionary, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDictionaryFormat {
    /// Source CSV, compiled when the engine loads it.
    Csv,
    /// Prebuilt binary dictionary.
    Bin,
}

impl UserDictionaryFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Bin => "bin",
        }
    }
}

impl fmt::Display for UserDictionaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for UserDictionaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "bin" => Ok(Self::Bin),
            other => Err(format!("unsupported user dictionary format '{}'", other)),
        }
    }
}

/// A user dictionary file and its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDictionary {
    path: PathBuf,
    format: UserDictionaryFormat,
}

impl UserDictionary {
    /// Accepts `.csv` and `.bin` files (case-insensitive extension).
    ///
    /// The file itself is not opened; the engine reports unreadable files.
    pub fn new(path: impl Into<PathBuf>) -> DictionaryResult<Self> {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| DictionaryError::Resolution {
                path: path.clone(),
                reason: "user dictionary has no file extension (expected .csv or .bin)".to_string(),
            })?;

        let format = extension
            .parse()
            .map_err(|reason| DictionaryError::Resolution {
                path: path.clone(),
                reason,
            })?;

        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> UserDictionaryFormat {
        self.format
    }
}
