//! Mapping dictionary versions to filesystem locations.
//!
//! Resolution is pure with respect to persistent bases: it computes where a
//! dictionary lives (or will live) without creating anything. For an
//! ephemeral base the first resolution of a (package, version) pair creates a
//! fresh private temporary directory and registers it with the
//! [`ResourceRegistry`]; later resolutions reuse it.

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use tracing::warn;

use crate::config::{env_dict_path, DictionaryConfig, PackageBase};
use crate::error::{DictionaryError, DictionaryResult};
use crate::lifecycle::{ResourceKey, ResourceRegistry};
use crate::version::DictionaryVersion;

/// Name of the dictionary directory inside a version directory.
pub const DICTIONARY_DIR_NAME: &str = "naist-jdic";

/// A resolved dictionary location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryPath {
    path: PathBuf,
    version_root: Option<PathBuf>,
}

impl DictionaryPath {
    /// A path supplied verbatim by the caller.
    pub fn from_override(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version_root: None,
        }
    }

    /// The managed dictionary directory under `version_root`.
    pub fn in_version_root(version_root: PathBuf) -> Self {
        Self {
            path: version_root.join(DICTIONARY_DIR_NAME),
            version_root: Some(version_root),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }

    /// The version directory archives are extracted into. `None` for overrides.
    pub fn version_root(&self) -> Option<&Path> {
        self.version_root.as_deref()
    }

    pub fn is_override(&self) -> bool {
        self.version_root.is_none()
    }

    /// Whether anything exists at this path.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl AsRef<Path> for DictionaryPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for DictionaryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Resolves dictionary versions to [`DictionaryPath`]s.
#[derive(Debug, Clone)]
pub struct PathResolver {
    package: String,
    base: PackageBase,
    registry: Arc<ResourceRegistry>,
}

impl PathResolver {
    /// Resolver using the process-wide resource registry.
    pub fn new(config: &DictionaryConfig) -> Self {
        Self::with_registry(config, ResourceRegistry::global())
    }

    /// Resolver registering ephemeral locations with `registry`.
    pub fn with_registry(config: &DictionaryConfig, registry: Arc<ResourceRegistry>) -> Self {
        Self {
            package: config.package.clone(),
            base: config.base.clone(),
            registry,
        }
    }

    pub fn base(&self) -> &PackageBase {
        &self.base
    }

    /// Resolve `version`, honouring `env_override` when it is non-empty.
    ///
    /// The override is returned verbatim for any version. Otherwise the path
    /// is `<package_base>/<version>/naist-jdic`. Never fails: malformed
    /// versions produce a valid path that simply does not exist.
    pub fn resolve(
        &self,
        version: &DictionaryVersion,
        env_override: Option<&str>,
    ) -> DictionaryPath {
        match env_override.filter(|p| !p.is_empty()) {
            Some(path) => DictionaryPath::from_override(path),
            None => DictionaryPath::in_version_root(self.version_root(version)),
        }
    }

    /// Resolve `version`, reading the override from `JPREPROCESS_DICT_PATH`.
    pub fn resolve_from_env(&self, version: &DictionaryVersion) -> DictionaryResult<DictionaryPath> {
        let env_override = env_dict_path()?;
        Ok(self.resolve(version, env_override.as_deref()))
    }

    /// Directory holding everything extracted for `version`.
    pub fn version_root(&self, version: &DictionaryVersion) -> PathBuf {
        match &self.base {
            PackageBase::Persistent(dir) => dir.join(version.path_component()),
            PackageBase::Ephemeral => {
                let key = ResourceKey::new(&self.package, version.as_str());
                let handle = self
                    .registry
                    .register(key, || ephemeral_root(&self.package, version));
                handle.root().join(version.path_component())
            }
        }
    }
}

/// Create a private directory to hold one ephemeral version.
///
/// The name is unpredictable, so nothing placed in the temp dir beforehand can
/// be mistaken for a cached dictionary.
fn ephemeral_root(package: &str, version: &DictionaryVersion) -> PathBuf {
    let prefix = format!("{}-{}-", package, version.path_component());
    match tempfile::Builder::new().prefix(&prefix).tempdir() {
        Ok(dir) => dir.into_path(),
        Err(e) => {
            // Extraction will most likely fail the same way and report it.
            let mut hasher = RandomState::new().build_hasher();
            hasher.write_u32(process::id());
            let root = std::env::temp_dir().join(format!("{}{:016x}", prefix, hasher.finish()));
            warn!(error = %e, path = %root.display(), "Failed to create temporary dictionary directory");
            root
        }
    }
}

/// Check that an override path is usable by the engine.
///
/// [`PathResolver::resolve`] never validates overrides; callers that want to
/// fail early on an obviously wrong value use this.
pub fn validate_override(path: &str) -> DictionaryResult<PathBuf> {
    let path = PathBuf::from(path);
    if path.as_os_str().is_empty() {
        return Err(DictionaryError::Resolution {
            path,
            reason: "path is empty".to_string(),
        });
    }
    if !path.is_absolute() {
        return Err(DictionaryError::Resolution {
            path,
            reason: "override must be an absolute path".to_string(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn resolver(base: &str) -> PathResolver {
        PathResolver::with_registry(
            &DictionaryConfig::new(base),
            Arc::new(ResourceRegistry::new()),
        )
    }

    #[test]
    fn test_resolve_persistent_layout() {
        let path = resolver("/data/jpreprocess").resolve(&"v0.8.1".into(), None);

        assert_eq!(path.as_path(), Path::new("/data/jpreprocess/v0.8.1/naist-jdic"));
        assert_eq!(path.version_root(), Some(Path::new("/data/jpreprocess/v0.8.1")));
        assert!(!path.is_override());
    }

    #[test]
    fn test_override_wins() {
        let path = resolver("/data").resolve(&"latest".into(), Some("/opt/my-dict"));

        assert_eq!(path.as_path(), Path::new("/opt/my-dict"));
        assert!(path.is_override());
        assert_eq!(path.version_root(), None);
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let path = resolver("/data").resolve(&"latest".into(), Some(""));
        assert_eq!(path.as_path(), Path::new("/data/latest/naist-jdic"));
    }

    #[test]
    fn test_resolve_does_not_touch_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let base = temp.path().join("base");

        let path = resolver(base.to_str().unwrap()).resolve(&"v1".into(), None);

        assert!(!path.exists());
        assert!(!base.exists());
    }

    #[test]
    fn test_traversal_version_stays_inside_base() {
        let path = resolver("/data").resolve(&"../../etc".into(), None);
        assert!(path.as_path().starts_with("/data"));
        assert_eq!(path.as_path().parent().unwrap().parent(), Some(Path::new("/data")));
    }

    #[test]
    fn test_ephemeral_registration_is_idempotent() {
        let registry = Arc::new(ResourceRegistry::new());
        let config = DictionaryConfig::default().with_base(PackageBase::Ephemeral);
        let resolver = PathResolver::with_registry(&config, Arc::clone(&registry));

        let first = resolver.resolve(&"v1".into(), None);
        let second = resolver.resolve(&"v1".into(), None);
        let other = resolver.resolve(&"v2".into(), None);

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(registry.len(), 2);
        assert!(first.as_path().ends_with(DICTIONARY_DIR_NAME));
        assert!(!first.exists());

        assert_eq!(registry.teardown_all(), 2);
        assert!(!first.version_root().unwrap().exists());
    }

    #[test]
    fn test_ephemeral_root_is_fresh_and_private() {
        let registry = Arc::new(ResourceRegistry::new());
        let config = DictionaryConfig::default()
            .with_base(PackageBase::Ephemeral)
            .with_package(format!("jpreprocess-resolver-{}", process::id()));
        let resolver = PathResolver::with_registry(&config, Arc::clone(&registry));

        // The name a guessable layout would have used.
        let guessed = std::env::temp_dir()
            .join(format!("{}-{}-v7", config.package, process::id()))
            .join(DICTIONARY_DIR_NAME);
        std::fs::create_dir_all(&guessed).unwrap();

        let path = resolver.resolve(&"v7".into(), None);
        let handle = registry.get(&ResourceKey::new(&config.package, "v7")).unwrap();

        assert_ne!(path.as_path(), guessed.as_path());
        assert!(handle.root().is_dir());
        assert!(path.as_path().starts_with(handle.root()));
        assert!(!path.exists());

        registry.teardown_all();
        assert!(!handle.root().exists());
        std::fs::remove_dir_all(guessed.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_validate_override() {
        assert!(validate_override("").is_err());
        assert!(validate_override("relative/dict").is_err());

        #[cfg(unix)]
        assert_eq!(
            validate_override("/opt/dict").unwrap(),
            PathBuf::from("/opt/dict")
        );
    }

    proptest! {
        #[test]
        fn prop_override_returned_unchanged(
            version in ".*",
            over in "/[a-zA-Z0-9_./-]{1,40}",
        ) {
            let path = resolver("/data").resolve(&DictionaryVersion::new(version), Some(&over));
            prop_assert_eq!(path.as_path(), Path::new(&over));
        }

        #[test]
        fn prop_resolution_is_deterministic(version in ".*") {
            let resolver = resolver("/data");
            let version = DictionaryVersion::new(version);
            prop_assert_eq!(resolver.resolve(&version, None), resolver.resolve(&version, None));
        }

        #[test]
        fn prop_resolution_stays_under_base(version in ".*") {
            let path = resolver("/data").resolve(&DictionaryVersion::new(version), None);
            let root = path.version_root().unwrap();
            prop_assert_eq!(root.parent(), Some(Path::new("/data")));
            prop_assert!(path.as_path().ends_with(DICTIONARY_DIR_NAME));
        }
    }
}
