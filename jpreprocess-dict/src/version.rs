//! Dictionary versions and the remote archives they map to.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Reserved version selecting the floating "latest release".
pub const LATEST: &str = "latest";

/// File name of the dictionary archive attached to every release.
pub const ARCHIVE_NAME: &str = "naist-jdic-jpreprocess.tar.gz";

/// Release area that archive URLs are templated from.
pub const DEFAULT_RELEASE_BASE_URL: &str = "https://github.com/jpreprocess/jpreprocess/releases";

/// An opaque dictionary version identifier, usually a release tag such as `v0.8.1`.
///
/// Equality is exact string equality; no normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DictionaryVersion(String);

impl DictionaryVersion {
    /// Create a version from any string. Never fails.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The floating `latest` version.
    pub fn latest() -> Self {
        Self(LATEST.to_string())
    }

    /// The version string exactly as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved `latest` alias.
    pub fn is_latest(&self) -> bool {
        self.0 == LATEST
    }

    /// The version as a single path component.
    ///
    /// `%`, path separators, NUL and a leading `.` are percent-encoded, so
    /// the component never escapes the directory it is joined onto and
    /// distinct versions never share a directory. The empty version maps to
    /// a lone `%`, which no other version produces.
    pub fn path_component(&self) -> String {
        if self.0.is_empty() {
            return "%".to_string();
        }

        let mut component = String::with_capacity(self.0.len());
        for (i, c) in self.0.chars().enumerate() {
            match c {
                '%' | '/' | '\\' | '\0' => component.push_str(&format!("%{:02X}", c as u32)),
                '.' if i == 0 => component.push_str("%2E"),
                c => component.push(c),
            }
        }
        component
    }

    /// Inverse of [`path_component`](Self::path_component).
    ///
    /// Returns `None` for names `path_component` never produces, such as
    /// staging directories or hand-made entries.
    pub fn from_path_component(component: &str) -> Option<Self> {
        if component == "%" {
            return Some(Self(String::new()));
        }

        let bytes = component.as_bytes();
        let mut decoded = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let hex = component.get(i + 1..i + 3)?;
                decoded.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            } else {
                decoded.push(bytes[i]);
                i += 1;
            }
        }

        let version = Self(String::from_utf8(decoded).ok()?);
        (version.path_component() == component).then_some(version)
    }
}

impl Default for DictionaryVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for DictionaryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DictionaryVersion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for DictionaryVersion {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DictionaryVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Location of a remote dictionary archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    url: String,
    content_length: Option<u64>,
}

impl ArchiveDescriptor {
    /// Build the descriptor for `version` under the given release area.
    ///
    /// `latest` maps to `<base>/latest/download/<archive>`, any other version
    /// to `<base>/download/<version>/<archive>`.
    pub fn for_version(version: &DictionaryVersion, release_base_url: &str) -> Self {
        let base = release_base_url.trim_end_matches('/');
        let url = if version.is_latest() {
            format!("{}/latest/download/{}", base, ARCHIVE_NAME)
        } else {
            format!("{}/download/{}/{}", base, version.as_str(), ARCHIVE_NAME)
        };

        Self {
            url,
            content_length: None,
        }
    }

    /// Descriptor for an arbitrary archive URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_length: None,
        }
    }

    /// Record the expected archive size, when known ahead of time.
    pub fn with_content_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}
