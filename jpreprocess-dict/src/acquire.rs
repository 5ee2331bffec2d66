//! Dictionary acquisition.
//!
//! This module orchestrates the full workflow:
//! 1. Resolve the dictionary path for a version
//! 2. Return immediately for overrides and cache hits
//! 3. Download the release archive into temporary storage
//! 4. Extract it into the version directory
//! 5. Confirm the dictionary directory now exists
//!
//! Acquisition is single-process safe only. Two processes acquiring the same
//! version at the same time may both download and both extract; the last
//! writer's files win and both calls succeed. No lock file is used.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{env_dict_path, DictionaryConfig, PackageBase};
use crate::error::{DictionaryError, DictionaryResult};
use crate::extractor::{ArchiveExtractor, TarGzExtractor};
use crate::fetch::{default_sink, ArchiveFetcher, HttpFetcher, LocalFetcher, ProgressSink};
use crate::lifecycle::ResourceRegistry;
use crate::resolver::{DictionaryPath, PathResolver, DICTIONARY_DIR_NAME};
use crate::version::{ArchiveDescriptor, DictionaryVersion, ARCHIVE_NAME};

/// How an acquisition was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The caller's override was returned without any checks.
    Override,
    /// The dictionary was already present.
    CacheHit,
    /// The archive was downloaded and extracted.
    Downloaded { bytes: u64, files: usize },
}

/// Result of [`DictionaryManager::acquire_with_outcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub path: DictionaryPath,
    pub outcome: AcquireOutcome,
}

/// A dictionary version present in the package base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedDictionary {
    pub version: String,
    pub path: PathBuf,
}

/// Resolves, downloads and caches dictionaries.
pub struct DictionaryManager {
    config: DictionaryConfig,
    resolver: PathResolver,
    fetcher: Box<dyn ArchiveFetcher>,
    extractor: Box<dyn ArchiveExtractor>,
    progress: Box<dyn ProgressSink>,
}

impl DictionaryManager {
    /// Create a manager for `config` using the process-wide resource registry.
    ///
    /// `file://` release URLs are served from the local filesystem, anything
    /// else over HTTP.
    pub fn new(config: DictionaryConfig) -> DictionaryResult<Self> {
        let fetcher: Box<dyn ArchiveFetcher> = if config.release_base_url.starts_with("file://") {
            Box::new(LocalFetcher::new())
        } else {
            Box::new(HttpFetcher::with_timeout(config.timeout).map_err(|e| {
                DictionaryError::Config(e.to_string())
            })?)
        };

        Ok(Self::with_parts(
            config,
            ResourceRegistry::global(),
            fetcher,
            Box::new(TarGzExtractor::new()),
        ))
    }

    /// Create a manager from explicit components.
    pub fn with_parts(
        config: DictionaryConfig,
        registry: Arc<ResourceRegistry>,
        fetcher: Box<dyn ArchiveFetcher>,
        extractor: Box<dyn ArchiveExtractor>,
    ) -> Self {
        let resolver = PathResolver::with_registry(&config, registry);
        Self {
            config,
            resolver,
            fetcher,
            extractor,
            progress: default_sink(ARCHIVE_NAME),
        }
    }

    /// Replace the progress sink.
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Resolve without touching the filesystem or network.
    pub fn resolve(&self, version: &DictionaryVersion, env_override: Option<&str>) -> DictionaryPath {
        self.resolver.resolve(version, env_override)
    }

    /// Archive location for `version`.
    pub fn descriptor(&self, version: &DictionaryVersion) -> ArchiveDescriptor {
        ArchiveDescriptor::for_version(version, &self.config.release_base_url)
    }

    /// Whether `version` is already present. Never downloads.
    pub fn is_cached(&self, version: &DictionaryVersion) -> bool {
        self.resolver.resolve(version, None).exists()
    }

    /// Return a usable dictionary path for `version`, downloading it if needed.
    pub fn acquire(
        &self,
        version: &DictionaryVersion,
        env_override: Option<&str>,
    ) -> DictionaryResult<DictionaryPath> {
        self.acquire_with_outcome(version, env_override)
            .map(|acquisition| acquisition.path)
    }

    /// [`acquire`](Self::acquire) with the override read from `JPREPROCESS_DICT_PATH`.
    pub fn acquire_from_env(&self, version: &DictionaryVersion) -> DictionaryResult<DictionaryPath> {
        let env_override = env_dict_path()?;
        self.acquire(version, env_override.as_deref())
    }

    /// Like [`acquire`](Self::acquire), also reporting whether a download happened.
    pub fn acquire_with_outcome(
        &self,
        version: &DictionaryVersion,
        env_override: Option<&str>,
    ) -> DictionaryResult<Acquisition> {
        let path = self.resolver.resolve(version, env_override);

        let version_root = match path.version_root() {
            None => {
                debug!(path = %path, "Using dictionary override");
                return Ok(Acquisition {
                    path,
                    outcome: AcquireOutcome::Override,
                });
            }
            Some(root) => root.to_path_buf(),
        };

        if path.exists() {
            debug!(version = %version, path = %path, "Dictionary cache hit");
            return Ok(Acquisition {
                path,
                outcome: AcquireOutcome::CacheHit,
            });
        }

        let descriptor = self.descriptor(version);
        let url = descriptor.url();
        info!(version = %version, url, path = %path, "Downloading dictionary");

        let archive = self
            .fetcher
            .fetch(&descriptor, self.progress.as_ref())
            .map_err(|e| e.into_dictionary_error(url, path.as_path()))?;
        let bytes = archive.bytes();

        info!(bytes, path = %version_root.display(), "Extracting dictionary");
        let summary = self.extractor.extract(archive, &version_root)?;

        if !path.exists() {
            return Err(DictionaryError::NotFound {
                url: url.to_string(),
                path: path.into_path_buf(),
            });
        }

        info!(version = %version, path = %path, files = summary.files, "Dictionary ready");
        Ok(Acquisition {
            path,
            outcome: AcquireOutcome::Downloaded {
                bytes,
                files: summary.files,
            },
        })
    }

    /// Delete the cached copy of `version`. Returns false if nothing was cached.
    pub fn remove(&self, version: &DictionaryVersion) -> DictionaryResult<bool> {
        let root = self.resolver.version_root(version);
        if !root.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&root).map_err(|e| DictionaryError::io(&root, e))?;
        info!(version = %version, path = %root.display(), "Removed cached dictionary");
        Ok(true)
    }

    /// Versions present in a persistent package base, sorted by name.
    ///
    /// Ephemeral bases are never listed: they only live for this process.
    pub fn cached_versions(&self) -> DictionaryResult<Vec<CachedDictionary>> {
        let base = match self.resolver.base() {
            PackageBase::Persistent(dir) => dir,
            PackageBase::Ephemeral => return Ok(Vec::new()),
        };

        if !base.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(base).map_err(|e| DictionaryError::io(base, e))?;
        let mut cached: Vec<CachedDictionary> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let version = DictionaryVersion::from_path_component(name.to_str()?)?;
                Some((version, entry.path().join(DICTIONARY_DIR_NAME)))
            })
            .filter(|(_, dict)| dict.is_dir())
            .map(|(version, path)| CachedDictionary {
                version: version.as_str().to_string(),
                path,
            })
            .collect();

        cached.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ExtractionSummary;
    use crate::fetch::{FetchError, FetchedArchive, NoProgress};
    use crate::test_support::{archive_bytes, fetched};
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Serves a fixed archive and counts fetches.
    struct StaticFetcher {
        bytes: Vec<u8>,
        calls: Rc<Cell<usize>>,
        urls: Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl ArchiveFetcher for StaticFetcher {
        fn fetch(
            &self,
            descriptor: &ArchiveDescriptor,
            _progress: &dyn ProgressSink,
        ) -> Result<FetchedArchive, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.urls.borrow_mut().push(descriptor.url().to_string());
            Ok(fetched(&self.bytes))
        }
    }

    /// Counts extractions and delegates to the real extractor.
    struct CountingExtractor {
        calls: Rc<Cell<usize>>,
    }

    impl ArchiveExtractor for CountingExtractor {
        fn extract(&self, archive: FetchedArchive, dest_dir: &Path) -> DictionaryResult<ExtractionSummary> {
            self.calls.set(self.calls.get() + 1);
            TarGzExtractor::new().extract(archive, dest_dir)
        }
    }

    struct FailingFetcher;

    impl ArchiveFetcher for FailingFetcher {
        fn fetch(
            &self,
            _descriptor: &ArchiveDescriptor,
            _progress: &dyn ProgressSink,
        ) -> Result<FetchedArchive, FetchError> {
            Err(FetchError::Status(404))
        }
    }

    struct Fixture {
        _temp: TempDir,
        base: PathBuf,
        manager: DictionaryManager,
        calls: Rc<Cell<usize>>,
        extractions: Rc<Cell<usize>>,
        urls: Rc<std::cell::RefCell<Vec<String>>>,
    }

    fn fixture(bytes: Vec<u8>) -> Fixture {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base");
        let calls = Rc::new(Cell::new(0));
        let extractions = Rc::new(Cell::new(0));
        let urls = Rc::new(std::cell::RefCell::new(Vec::new()));

        let manager = DictionaryManager::with_parts(
            DictionaryConfig::new(&base),
            Arc::new(ResourceRegistry::new()),
            Box::new(StaticFetcher {
                bytes,
                calls: Rc::clone(&calls),
                urls: Rc::clone(&urls),
            }),
            Box::new(CountingExtractor {
                calls: Rc::clone(&extractions),
            }),
        )
        .with_progress(Box::new(NoProgress));

        Fixture {
            _temp: temp,
            base,
            manager,
            calls,
            extractions,
            urls,
        }
    }

    fn dictionary_archive() -> Vec<u8> {
        archive_bytes(&[
            ("naist-jdic/char_def.bin", b"c".as_slice()),
            ("naist-jdic/dict.words", b"w".as_slice()),
        ])
    }

    #[test]
    fn test_second_acquire_is_cache_hit() {
        let fx = fixture(dictionary_archive());
        let version = DictionaryVersion::new("v0.8.1");

        let first = fx.manager.acquire_with_outcome(&version, None).unwrap();
        let second = fx.manager.acquire_with_outcome(&version, None).unwrap();

        assert_eq!(fx.calls.get(), 1);
        assert_eq!(fx.extractions.get(), 1);
        assert!(matches!(first.outcome, AcquireOutcome::Downloaded { files: 2, .. }));
        assert_eq!(second.outcome, AcquireOutcome::CacheHit);
        assert_eq!(first.path, second.path);
        assert_eq!(first.path.as_path(), fx.base.join("v0.8.1").join("naist-jdic"));
    }

    #[test]
    fn test_latest_and_tag_use_their_urls() {
        let fx = fixture(dictionary_archive());

        let latest = fx.manager.acquire(&DictionaryVersion::latest(), None).unwrap();
        let tagged = fx.manager.acquire(&"v1.2.3".into(), None).unwrap();

        assert!(fs::read_dir(latest.as_path()).unwrap().next().is_some());
        assert!(fs::read_dir(tagged.as_path()).unwrap().next().is_some());
        assert_eq!(
            *fx.urls.borrow(),
            vec![
                "https://github.com/jpreprocess/jpreprocess/releases/latest/download/naist-jdic-jpreprocess.tar.gz".to_string(),
                "https://github.com/jpreprocess/jpreprocess/releases/download/v1.2.3/naist-jdic-jpreprocess.tar.gz".to_string(),
            ]
        );
    }

    #[test]
    fn test_override_skips_everything() {
        let fx = fixture(dictionary_archive());

        let acquisition = fx
            .manager
            .acquire_with_outcome(&"v1".into(), Some("/does/not/exist"))
            .unwrap();

        assert_eq!(acquisition.outcome, AcquireOutcome::Override);
        assert_eq!(acquisition.path.as_path(), std::path::Path::new("/does/not/exist"));
        assert_eq!(fx.calls.get(), 0);
        assert!(!fx.base.exists());
    }

    #[test]
    fn test_existing_directory_is_cache_hit() {
        let fx = fixture(dictionary_archive());
        fs::create_dir_all(fx.base.join("v2").join("naist-jdic")).unwrap();

        let acquisition = fx.manager.acquire_with_outcome(&"v2".into(), None).unwrap();

        assert_eq!(acquisition.outcome, AcquireOutcome::CacheHit);
        assert_eq!(fx.calls.get(), 0);
    }

    #[test]
    fn test_corrupt_archive_is_not_cached() {
        let mut bytes = dictionary_archive();
        bytes.truncate(bytes.len() / 2);
        let fx = fixture(bytes);
        let version = DictionaryVersion::new("v3");

        let err = fx.manager.acquire(&version, None).unwrap_err();

        assert!(matches!(err, DictionaryError::Extraction { .. }));
        assert!(!fx.manager.is_cached(&version));

        // A retry attempts the download again instead of reporting a cache hit
        let _ = fx.manager.acquire(&version, None);
        assert_eq!(fx.calls.get(), 2);
    }

    #[test]
    fn test_wrong_layout_is_not_found() {
        let fx = fixture(archive_bytes(&[("other-dict/data.bin", b"x".as_slice())]));

        let err = fx.manager.acquire(&"v4".into(), None).unwrap_err();

        match err {
            DictionaryError::NotFound { url, path } => {
                assert!(url.contains("/download/v4/"));
                assert!(path.ends_with("v4/naist-jdic"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_network_error_carries_url_and_path() {
        let temp = TempDir::new().unwrap();
        let manager = DictionaryManager::with_parts(
            DictionaryConfig::new(temp.path()),
            Arc::new(ResourceRegistry::new()),
            Box::new(FailingFetcher),
            Box::new(TarGzExtractor::new()),
        );

        let err = manager.acquire(&"v9.9.9".into(), None).unwrap_err();

        assert!(err.is_network());
        let message = err.to_string();
        assert!(message.contains("download/v9.9.9/naist-jdic-jpreprocess.tar.gz"));
        assert!(message.contains("naist-jdic"));
        assert!(message.contains("404"));
        assert!(!temp.path().join("v9.9.9").exists());
    }

    #[test]
    fn test_remove_and_list() {
        let fx = fixture(dictionary_archive());
        fx.manager.acquire(&"v1".into(), None).unwrap();
        fx.manager.acquire(&"v2".into(), None).unwrap();

        let versions: Vec<String> = fx
            .manager
            .cached_versions()
            .unwrap()
            .into_iter()
            .map(|c| c.version)
            .collect();
        assert_eq!(versions, vec!["v1", "v2"]);

        assert!(fx.manager.remove(&"v1".into()).unwrap());
        assert!(!fx.manager.remove(&"v1".into()).unwrap());
        assert!(!fx.manager.is_cached(&"v1".into()));
        assert!(fx.manager.is_cached(&"v2".into()));
    }

    #[test]
    fn test_similar_versions_do_not_share_cache() {
        let fx = fixture(dictionary_archive());

        let underscore = fx.manager.acquire_with_outcome(&"release_v1".into(), None).unwrap();
        let slash = fx.manager.acquire_with_outcome(&"release/v1".into(), None).unwrap();

        assert!(matches!(slash.outcome, AcquireOutcome::Downloaded { .. }));
        assert_ne!(underscore.path, slash.path);
        assert_eq!(fx.calls.get(), 2);
        assert_eq!(
            fx.urls.borrow()[1],
            "https://github.com/jpreprocess/jpreprocess/releases/download/release/v1/naist-jdic-jpreprocess.tar.gz"
        );

        let versions: Vec<String> = fx
            .manager
            .cached_versions()
            .unwrap()
            .into_iter()
            .map(|c| c.version)
            .collect();
        assert_eq!(versions, vec!["release/v1", "release_v1"]);
    }

    #[test]
    fn test_cached_versions_skips_foreign_entries() {
        let fx = fixture(dictionary_archive());
        fx.manager.acquire(&"v1".into(), None).unwrap();
        fs::create_dir_all(fx.base.join(".staging-x").join("naist-jdic")).unwrap();
        fs::create_dir_all(fx.base.join("bad%zz").join("naist-jdic")).unwrap();

        let versions: Vec<String> = fx
            .manager
            .cached_versions()
            .unwrap()
            .into_iter()
            .map(|c| c.version)
            .collect();
        assert_eq!(versions, vec!["v1"]);
    }

    #[test]
    fn test_cached_versions_of_missing_base() {
        let fx = fixture(dictionary_archive());
        assert!(fx.manager.cached_versions().unwrap().is_empty());
    }
}
