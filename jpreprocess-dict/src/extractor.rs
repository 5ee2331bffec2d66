//! Archive extraction for dictionary installation.
//!
//! Archives are gzip-compressed tar streams, read in a single pass. Entries
//! are unpacked into a staging directory next to the destination and moved
//! into place only once the whole archive has been read successfully, so a
//! corrupt download never leaves a half-written dictionary behind.
//!
//! Staging directories left by a process that died mid-extraction are swept
//! on the next extraction into the same parent once they are older than
//! [`DEFAULT_STALE_AFTER`].

use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path};
use std::time::{Duration, SystemTime};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tracing::{debug, warn};

use crate::error::{DictionaryError, DictionaryResult};
use crate::fetch::FetchedArchive;

/// What an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub files: usize,
    pub directories: usize,
}

/// Extracts a fetched archive into a directory.
pub trait ArchiveExtractor {
    /// Extract `archive` under `dest_dir`, consuming the temporary store.
    fn extract(&self, archive: FetchedArchive, dest_dir: &Path) -> DictionaryResult<ExtractionSummary>;
}

const STAGING_PREFIX: &str = ".staging-";

/// Age after which an abandoned staging directory is removed.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// In-process `.tar.gz` extractor.
///
/// Only regular files and directories are accepted; links, devices and
/// entries escaping the destination are rejected.
#[derive(Debug, Clone, Copy)]
pub struct TarGzExtractor {
    stale_after: Duration,
}

impl Default for TarGzExtractor {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

impl TarGzExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweep staging directories older than `age` instead of the default.
    ///
    /// Younger ones may belong to an extraction still running in another
    /// process.
    pub fn with_stale_after(mut self, age: Duration) -> Self {
        self.stale_after = age;
        self
    }

    /// Remove abandoned staging directories in `parent`. Best effort.
    fn sweep_stale_staging(&self, parent: &Path) -> usize {
        let entries = match fs::read_dir(parent) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in entries.flatten() {
            if !entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_dir() {
                continue;
            }
            let age = meta
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < self.stale_after {
                continue;
            }

            match fs::remove_dir_all(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Failed to remove stale staging directory")
                }
            }
        }

        if removed > 0 {
            debug!(removed, path = %parent.display(), "Swept stale staging directories");
        }
        removed
    }

    fn unpack_into<R: Read>(
        &self,
        reader: R,
        staging: &Path,
    ) -> Result<ExtractionSummary, String> {
        let mut archive = Archive::new(GzDecoder::new(reader));
        archive.set_overwrite(true);

        let mut summary = ExtractionSummary::default();
        let entries = archive.entries().map_err(|e| e.to_string())?;

        for entry in entries {
            let mut entry = entry.map_err(|e| format!("corrupt archive: {}", e))?;
            let entry_type = entry.header().entry_type();
            let path = entry
                .path()
                .map_err(|e| format!("invalid entry path: {}", e))?
                .into_owned();

            match entry_type {
                EntryType::Regular | EntryType::Continuous => summary.files += 1,
                EntryType::Directory => summary.directories += 1,
                EntryType::XGlobalHeader => continue,
                other => {
                    return Err(format!(
                        "unsupported entry type {:?} for {}",
                        other,
                        path.display()
                    ))
                }
            }

            if path.is_absolute()
                || path
                    .components()
                    .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
            {
                return Err(format!("entry escapes destination: {}", path.display()));
            }

            let unpacked = entry
                .unpack_in(staging)
                .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
            if !unpacked {
                return Err(format!("entry escapes destination: {}", path.display()));
            }
        }

        // Drain the rest of the stream so a truncated or corrupt gzip trailer
        // is reported even when the tar end marker was already reached.
        io::copy(&mut archive.into_inner(), &mut io::sink())
            .map_err(|e| format!("corrupt archive: {}", e))?;

        Ok(summary)
    }
}

impl ArchiveExtractor for TarGzExtractor {
    fn extract(&self, archive: FetchedArchive, dest_dir: &Path) -> DictionaryResult<ExtractionSummary> {
        let url = archive.url().to_string();
        let fail = |reason: String| DictionaryError::Extraction {
            url: url.clone(),
            path: dest_dir.to_path_buf(),
            reason,
        };

        let parent = dest_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .map_err(|e| fail(format!("failed to create {}: {}", parent.display(), e)))?;
        self.sweep_stale_staging(parent);

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| fail(format!("failed to create staging directory: {}", e)))?;

        // The temporary store is closed when the reader is dropped, on
        // success and failure alike.
        let reader = BufReader::new(archive.into_file());
        let summary = self.unpack_into(reader, staging.path()).map_err(&fail)?;

        fs::create_dir_all(dest_dir)
            .map_err(|e| fail(format!("failed to create {}: {}", dest_dir.display(), e)))?;
        let staged = fs::read_dir(staging.path())
            .map_err(|e| fail(format!("failed to read staging directory: {}", e)))?;

        for item in staged {
            let item = item.map_err(|e| fail(e.to_string()))?;
            let target = dest_dir.join(item.file_name());
            replace_with(&item.path(), &target)
                .map_err(|e| fail(format!("failed to move {} into place: {}", target.display(), e)))?;
        }

        debug!(
            path = %dest_dir.display(),
            files = summary.files,
            directories = summary.directories,
            "Archive extracted"
        );

        Ok(summary)
    }
}

/// Move `source` to `target`, replacing whatever is there.
fn replace_with(source: &Path, target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(target)?,
        Ok(_) => fs::remove_file(target)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::rename(source, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{archive_bytes, fetched, raw_entry_archive};
    use tempfile::TempDir;

    #[test]
    fn test_extract_dictionary_layout() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("v0.8.1");
        let bytes = archive_bytes(&[
            ("naist-jdic/char_def.bin", b"chars".as_slice()),
            ("naist-jdic/dict.da", b"da".as_slice()),
        ]);

        let summary = TarGzExtractor::new().extract(fetched(&bytes), &dest).unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(
            fs::read_to_string(dest.join("naist-jdic/char_def.bin")).unwrap(),
            "chars"
        );
        assert!(dest.join("naist-jdic/dict.da").is_file());
    }

    #[test]
    fn test_creates_missing_parents() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a").join("b").join("latest");
        let bytes = archive_bytes(&[("naist-jdic/matrix.mtx", b"m".as_slice())]);

        TarGzExtractor::new().extract(fetched(&bytes), &dest).unwrap();

        assert!(dest.join("naist-jdic/matrix.mtx").exists());
    }

    #[test]
    fn test_no_staging_left_behind() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("v1");
        let bytes = archive_bytes(&[("naist-jdic/x", b"x".as_slice())]);

        TarGzExtractor::new().extract(fetched(&bytes), &dest).unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_sweeps_abandoned_staging() {
        let temp = TempDir::new().unwrap();
        let abandoned = temp.path().join(".staging-old");
        fs::create_dir_all(abandoned.join("naist-jdic")).unwrap();
        fs::write(abandoned.join("naist-jdic/partial.bin"), "half").unwrap();
        let unrelated = temp.path().join("v0");
        fs::create_dir_all(&unrelated).unwrap();

        let bytes = archive_bytes(&[("naist-jdic/x", b"x".as_slice())]);
        TarGzExtractor::new()
            .with_stale_after(Duration::ZERO)
            .extract(fetched(&bytes), &temp.path().join("v1"))
            .unwrap();

        assert!(!abandoned.exists());
        assert!(unrelated.exists());
        assert!(temp.path().join("v1/naist-jdic/x").exists());
    }

    #[test]
    fn test_keeps_recent_staging() {
        let temp = TempDir::new().unwrap();
        let in_progress = temp.path().join(".staging-busy");
        fs::create_dir_all(&in_progress).unwrap();

        let bytes = archive_bytes(&[("naist-jdic/x", b"x".as_slice())]);
        TarGzExtractor::new()
            .extract(fetched(&bytes), &temp.path().join("v1"))
            .unwrap();

        assert!(in_progress.exists());
    }

    #[test]
    fn test_truncated_gzip_fails_without_output() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("v1");
        let payload = vec![b'a'; 200_000];
        let bytes = archive_bytes(&[("naist-jdic/big.bin", payload.as_slice())]);
        let truncated = &bytes[..bytes.len() / 2];

        let err = TarGzExtractor::new()
            .extract(fetched(truncated), &dest)
            .unwrap_err();

        assert!(matches!(err, DictionaryError::Extraction { .. }));
        assert!(!dest.join("naist-jdic").exists());
    }

    #[test]
    fn test_not_gzip_fails() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("v1");

        let err = TarGzExtractor::new()
            .extract(fetched(b"<html>404</html>"), &dest)
            .unwrap_err();

        assert!(matches!(err, DictionaryError::Extraction { .. }));
        assert!(err.to_string().contains("file:///test/naist-jdic-jpreprocess.tar.gz"));
    }

    #[test]
    fn test_rejects_parent_dir_entry() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("inner").join("v1");
        let bytes = raw_entry_archive("../evil.txt", EntryType::Regular, b"boom");

        let err = TarGzExtractor::new().extract(fetched(&bytes), &dest).unwrap_err();

        assert!(err.to_string().contains("escapes destination"));
        assert!(!temp.path().join("inner").join("evil.txt").exists());
    }

    #[test]
    fn test_rejects_symlink_entry() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("v1");
        let bytes = raw_entry_archive("naist-jdic/link", EntryType::Symlink, b"");

        let err = TarGzExtractor::new().extract(fetched(&bytes), &dest).unwrap_err();

        assert!(err.to_string().contains("unsupported entry type"));
        assert!(!dest.join("naist-jdic").exists());
    }

    #[test]
    fn test_replaces_existing_entries() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("v1");
        fs::create_dir_all(dest.join("naist-jdic")).unwrap();
        fs::write(dest.join("naist-jdic/stale.bin"), "old").unwrap();

        let bytes = archive_bytes(&[("naist-jdic/fresh.bin", b"new".as_slice())]);
        TarGzExtractor::new().extract(fetched(&bytes), &dest).unwrap();

        assert!(dest.join("naist-jdic/fresh.bin").exists());
        assert!(!dest.join("naist-jdic/stale.bin").exists());
    }
}
