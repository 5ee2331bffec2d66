//! jpreprocess-dict - dictionary acquisition for jpreprocess
//!
//! The preprocessing engine needs the `naist-jdic` dictionary at runtime.
//! This library resolves a dictionary version to a local directory, and if
//! the directory is missing, downloads the release archive once and extracts
//! it there. It also provides a thin binding that opens an engine on the
//! resolved dictionary.
//!
//! # Example
//!
//! ```no_run
//! use jpreprocess_dict::{DictionaryConfig, DictionaryManager, DictionaryVersion};
//!
//! let manager = DictionaryManager::new(DictionaryConfig::from_env())?;
//! let path = manager.acquire_from_env(&DictionaryVersion::latest())?;
//! println!("dictionary at {}", path);
//! # Ok::<(), jpreprocess_dict::DictionaryError>(())
//! ```
//!
//! Directories created in a temporary package location are released through
//! the [`ResourceRegistry`]; binaries should hold a [`ShutdownGuard`] for the
//! lifetime of `main`.

pub mod acquire;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod lifecycle;
pub mod resolver;
pub mod version;

#[cfg(test)]
pub(crate) mod test_support;

pub use acquire::{AcquireOutcome, Acquisition, CachedDictionary, DictionaryManager};
pub use config::{DictionaryConfig, PackageBase};
pub use engine::{jpreprocess, EngineConfig, Frontend, G2pOutput, JPreprocess, NjdFeature};
#[cfg(feature = "jpreprocess-engine")]
pub use engine::NativeFrontend;
pub use error::{DictionaryError, DictionaryResult};
pub use lifecycle::{ResourceRegistry, ShutdownGuard};
pub use resolver::{DictionaryPath, PathResolver};
pub use version::DictionaryVersion;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
