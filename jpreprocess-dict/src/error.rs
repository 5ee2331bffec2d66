//! Error types for dictionary resolution and acquisition.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for dictionary operations.
pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// Errors that can occur while resolving, downloading or extracting a dictionary.
///
/// Acquisition failures carry both the attempted URL and the target path so
/// that the message alone is enough to diagnose a failed download.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The dictionary path could not be used (e.g. a relative override).
    #[error("unusable dictionary path {}: {reason}", path.display())]
    Resolution { path: PathBuf, reason: String },

    /// Connecting to or reading from the remote archive failed.
    #[error("failed to download {url} into {}: {reason}", path.display())]
    Network {
        url: String,
        path: PathBuf,
        reason: String,
    },

    /// The request exceeded the configured transport timeout.
    #[error("request to {url} timed out (target {})", path.display())]
    Timeout { url: String, path: PathBuf },

    /// The server answered with a non-success status.
    #[error("download of {url} failed with HTTP status {status} (target {})", path.display())]
    HttpStatus {
        url: String,
        path: PathBuf,
        status: u16,
    },

    /// The archive was corrupt, contained a disallowed entry, or could not be written.
    #[error("failed to extract {url} into {}: {reason}", path.display())]
    Extraction {
        url: String,
        path: PathBuf,
        reason: String,
    },

    /// Extraction finished but the expected dictionary directory is missing.
    #[error("dictionary not found at {} after extracting {url}", path.display())]
    NotFound { url: String, path: PathBuf },

    /// Filesystem operation failed outside of extraction.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external preprocessing engine reported an error.
    #[error("engine error: {0}")]
    Engine(String),

    /// Invalid configuration value or unreadable config file.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DictionaryError {
    /// Returns true for failures raised while talking to the remote server.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }

    /// Returns the URL attempted by a failed acquisition, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Extraction { url, .. }
            | Self::NotFound { url, .. } => Some(url),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
