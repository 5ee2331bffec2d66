//! Fetching dictionary archives into private temporary storage.
//!
//! - `http`: blocking HTTP(S) downloads
//! - `local`: `file://` mirrors and pre-downloaded archives
//! - `progress`: optional progress reporting
//!
//! Archives are always streamed into an unnamed temporary file, never into the
//! cache directory, so a partial download is never visible at a dictionary
//! path. Failures are reported as [`FetchError`] and given URL and target
//! context by the caller.

mod http;
mod local;
mod progress;

pub use http::HttpFetcher;
pub use local::LocalFetcher;
#[cfg(feature = "progress-bar")]
pub use progress::BarProgress;
pub use progress::{default_sink, CallbackProgress, NoProgress, ProgressSink};

use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;

use crate::error::DictionaryError;
use crate::version::ArchiveDescriptor;

/// Buffer size for streaming archives to temporary storage (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Failure of a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport could not be set up.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Connection failure or error while reading the body.
    #[error("{0}")]
    Transport(String),

    /// The transport timed out.
    #[error("timed out")]
    Timeout,

    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Reading the source or writing temporary storage failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The URL scheme is not handled by this fetcher.
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),
}

impl FetchError {
    /// Attach the attempted URL and the dictionary target path.
    pub fn into_dictionary_error(self, url: &str, target: &Path) -> DictionaryError {
        let url = url.to_string();
        let path = target.to_path_buf();
        match self {
            Self::Timeout => DictionaryError::Timeout { url, path },
            Self::Status(status) => DictionaryError::HttpStatus { url, path, status },
            other => DictionaryError::Network {
                url,
                path,
                reason: other.to_string(),
            },
        }
    }
}

/// A fully downloaded archive held in an unnamed temporary file.
///
/// The file is deleted by the OS as soon as it is dropped.
#[derive(Debug)]
pub struct FetchedArchive {
    file: File,
    bytes: u64,
    total: Option<u64>,
    url: String,
}

impl FetchedArchive {
    /// Number of bytes written to temporary storage.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Size announced by the source, if any.
    pub fn announced_size(&self) -> Option<u64> {
        self.total
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Consume the archive, returning the temporary file positioned at the start.
    pub fn into_file(self) -> File {
        self.file
    }
}

/// Retrieves a remote archive. One attempt, no retry.
pub trait ArchiveFetcher {
    fn fetch(
        &self,
        descriptor: &ArchiveDescriptor,
        progress: &dyn ProgressSink,
    ) -> Result<FetchedArchive, FetchError>;
}

/// Stream `reader` into a new unnamed temporary file, reporting each chunk.
///
/// Returns the archive rewound to its first byte.
pub(crate) fn stream_to_temp<R: Read>(
    mut reader: R,
    url: &str,
    total: Option<u64>,
    progress: &dyn ProgressSink,
    map_read_error: impl Fn(io::Error) -> FetchError,
) -> Result<FetchedArchive, FetchError> {
    let file = tempfile::tempfile()?;
    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut written = 0u64;

    progress.on_start(total);

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(&map_read_error)?;
        if bytes_read == 0 {
            break;
        }

        writer.write_all(&buffer[..bytes_read])?;
        written += bytes_read as u64;
        progress.on_chunk(written, total);
    }

    progress.on_finish(written);

    let mut file = writer.into_inner().map_err(|e| e.into_error())?;
    file.seek(SeekFrom::Start(0))?;

    Ok(FetchedArchive {
        file,
        bytes: written,
        total,
        url: url.to_string(),
    })
}
