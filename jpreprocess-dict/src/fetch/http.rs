//! HTTP archive fetcher.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::{stream_to_temp, ArchiveFetcher, FetchError, FetchedArchive, ProgressSink};
use crate::version::ArchiveDescriptor;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("jpreprocess-dict/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP(S) fetcher.
///
/// Makes exactly one GET request per fetch. Redirects (GitHub release
/// downloads always redirect) are followed by the client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Create a fetcher using the transport's default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(None)
    }

    /// Create a fetcher with an explicit timeout, or the transport default for `None`.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(
        &self,
        descriptor: &ArchiveDescriptor,
        progress: &dyn ProgressSink,
    ) -> Result<FetchedArchive, FetchError> {
        let url = descriptor.url();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let total = response.content_length().or(descriptor.content_length());
        debug!(url, total = ?total, "Streaming archive to temporary storage");

        stream_to_temp(response, url, total, progress, |e| {
            // reqwest surfaces body timeouts as io errors wrapping its own error
            if e.kind() == std::io::ErrorKind::TimedOut {
                FetchError::Timeout
            } else {
                FetchError::Transport(format!("read error: {}", e))
            }
        })
    }
}
