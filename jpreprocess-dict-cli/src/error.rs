//! CLI error type.

use std::fmt;

use jpreprocess_dict::DictionaryError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Resolution, download or extraction failed.
    Dictionary(DictionaryError),
    /// Bad configuration key/value or unusable setup.
    Config(String),
    /// Output could not be encoded.
    Output(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Dictionary(e) => write!(f, "{}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Output(e) => write!(f, "Failed to encode output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Dictionary(e) => e.source(),
            CliError::Config(_) => None,
            CliError::Output(e) => Some(e),
        }
    }
}

impl From<DictionaryError> for CliError {
    fn from(e: DictionaryError) -> Self {
        CliError::Dictionary(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}

impl CliError {
    /// Print the error and its causes to stderr.
    pub fn report(&self) {
        eprintln!("Error: {}", self);

        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
    }
}
