//! Fetcher for archives already on the local filesystem.
//!
//! Serves `file://` release mirrors (`JPREPROCESS_DICT_URL=file:///mnt/mirror`)
//! with the same semantics as the HTTP fetcher: the archive is copied into
//! private temporary storage with progress reporting.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use super::{stream_to_temp, ArchiveFetcher, FetchError, FetchedArchive, ProgressSink};
use crate::version::ArchiveDescriptor;

/// Fetches `file://` URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFetcher;

impl LocalFetcher {
    pub fn new() -> Self {
        Self
    }

    /// Filesystem path for a `file://` URL.
    fn path_for(url: &str) -> Option<PathBuf> {
        url.strip_prefix("file://").map(PathBuf::from)
    }
}

impl ArchiveFetcher for LocalFetcher {
    fn fetch(
        &self,
        descriptor: &ArchiveDescriptor,
        progress: &dyn ProgressSink,
    ) -> Result<FetchedArchive, FetchError> {
        let url = descriptor.url();
        let path = Self::path_for(url).ok_or_else(|| FetchError::UnsupportedUrl(url.to_string()))?;

        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::Status(404),
            _ => FetchError::Io(e),
        })?;
        let total = file.metadata().ok().map(|m| m.len());

        stream_to_temp(file, url, total, progress, FetchError::Io)
    }
}
