//! Process-wide registry of resources that must be released at exit.
//!
//! Dictionaries resolved into a temporary package location stay valid for as
//! long as the engine built on top of them lives, which can outlive the call
//! that resolved them. Their backing directories are therefore not owned by
//! the caller: they are registered here and released exactly once when the
//! process shuts down, either through [`ResourceRegistry::teardown_all`] or a
//! [`ShutdownGuard`] dropped at the end of `main`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Identity of a registered resource: one per (package, version) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    package: String,
    version: String,
}

impl ResourceKey {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.version)
    }
}

#[derive(Debug)]
struct HandleInner {
    key: ResourceKey,
    root: PathBuf,
    released: AtomicBool,
}

/// A reference to a registered resource.
///
/// Clones share the same underlying registration. Dropping a handle never
/// releases the resource; only the registry does.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    inner: Arc<HandleInner>,
}

impl ResourceHandle {
    pub fn key(&self) -> &ResourceKey {
        &self.inner.key
    }

    /// Directory backing this resource.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Whether two handles refer to the same registration.
    pub fn same_as(&self, other: &ResourceHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Remove the backing directory. Returns false if already released.
    fn release(&self) -> bool {
        if self.inner.released.swap(true, Ordering::SeqCst) {
            return false;
        }

        let root = &self.inner.root;
        if root.exists() {
            if let Err(e) = fs::remove_dir_all(root) {
                warn!(resource = %self.inner.key, path = %root.display(), error = %e, "Failed to release resource");
                return true;
            }
        }
        debug!(resource = %self.inner.key, path = %root.display(), "Released resource");
        true
    }
}

/// Registry of resource handles awaiting release at process exit.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    handles: Mutex<HashMap<ResourceKey, ResourceHandle>>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<ResourceRegistry>> = OnceLock::new();

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ResourceRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(ResourceRegistry::new())))
    }

    /// Register the resource identified by `key`, or return the existing handle.
    ///
    /// `root` is only evaluated for the first registration of a key.
    pub fn register(&self, key: ResourceKey, root: impl FnOnce() -> PathBuf) -> ResourceHandle {
        let mut handles = self.handles.lock();

        if let Some(existing) = handles.get(&key) {
            return existing.clone();
        }

        let handle = ResourceHandle {
            inner: Arc::new(HandleInner {
                key: key.clone(),
                root: root(),
                released: AtomicBool::new(false),
            }),
        };
        debug!(resource = %key, path = %handle.root().display(), "Registered resource");
        handles.insert(key, handle.clone());
        handle
    }

    /// Look up a registration without creating one.
    pub fn get(&self, key: &ResourceKey) -> Option<ResourceHandle> {
        self.handles.lock().get(key).cloned()
    }

    /// Number of handles currently awaiting release.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Release every registered handle.
    ///
    /// Each handle is released exactly once; calling this again only releases
    /// handles registered since the previous call. Returns the number of
    /// handles released by this call.
    pub fn teardown_all(&self) -> usize {
        let drained: Vec<ResourceHandle> = {
            let mut handles = self.handles.lock();
            handles.drain().map(|(_, handle)| handle).collect()
        };

        let released = drained.iter().filter(|handle| handle.release()).count();
        if released > 0 {
            debug!(released, "Resource registry torn down");
        }
        released
    }

    /// Guard that tears this registry down when dropped.
    pub fn shutdown_guard(self: &Arc<Self>) -> ShutdownGuard {
        ShutdownGuard {
            registry: Arc::clone(self),
        }
    }
}

/// Tears down a [`ResourceRegistry`] when dropped.
///
/// Hold one for the lifetime of `main`.
#[must_use = "the registry is torn down as soon as the guard is dropped"]
pub struct ShutdownGuard {
    registry: Arc<ResourceRegistry>,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.registry.teardown_all();
    }
}
