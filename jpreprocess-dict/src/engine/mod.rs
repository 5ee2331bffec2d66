//! Binding to the preprocessing engine.
//!
//! The engine itself (morphological analysis, accent and mora computation,
//! label generation) lives outside this crate and is plugged in through the
//! [`Frontend`] trait. This module only threads a resolved dictionary into it
//! and assembles `g2p` output from its results. With the `jpreprocess-engine`
//! feature, [`NativeFrontend`] plugs in the `jpreprocess` crate.

mod feature;
mod g2p;
#[cfg(feature = "jpreprocess-engine")]
mod native;
mod user_dictionary;

pub use feature::NjdFeature;
pub use g2p::G2pOutput;
#[cfg(feature = "jpreprocess-engine")]
pub use native::NativeFrontend;
pub use user_dictionary::{UserDictionary, UserDictionaryFormat};

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::acquire::DictionaryManager;
use crate::config::DictionaryConfig;
use crate::error::{DictionaryError, DictionaryResult};
use crate::version::DictionaryVersion;

/// What the engine is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory of the system dictionary.
    pub dictionary: PathBuf,
    pub user_dictionary: Option<UserDictionary>,
}

impl EngineConfig {
    pub fn new(dictionary: impl Into<PathBuf>) -> Self {
        Self {
            dictionary: dictionary.into(),
            user_dictionary: None,
        }
    }

    pub fn with_user_dictionary(mut self, user_dictionary: UserDictionary) -> Self {
        self.user_dictionary = Some(user_dictionary);
        self
    }
}

/// Operations provided by the external engine.
pub trait Frontend: Sized {
    type Error: fmt::Display;

    /// Load the dictionaries named in `config`.
    fn open(config: &EngineConfig) -> Result<Self, Self::Error>;

    /// Analyse `text` into feature records.
    fn run_frontend(&self, text: &str) -> Result<Vec<NjdFeature>, Self::Error>;

    /// Turn (possibly edited) feature records into full-context labels.
    fn make_label(&self, features: &[NjdFeature]) -> Result<Vec<String>, Self::Error>;

    /// Full-context labels for `text`.
    fn extract_fullcontext(&self, text: &str) -> Result<Vec<String>, Self::Error>;
}

fn engine_error<E: fmt::Display>(e: E) -> DictionaryError {
    DictionaryError::Engine(e.to_string())
}

/// An engine opened on a resolved dictionary.
#[derive(Debug)]
pub struct JPreprocess<F> {
    frontend: F,
    config: EngineConfig,
}

impl<F: Frontend> JPreprocess<F> {
    pub fn new(config: EngineConfig) -> DictionaryResult<Self> {
        debug!(
            dictionary = %config.dictionary.display(),
            user_dictionary = ?config.user_dictionary.as_ref().map(UserDictionary::path),
            "Opening engine"
        );
        let frontend = F::open(&config).map_err(engine_error)?;
        Ok(Self { frontend, config })
    }

    /// Acquire `version` through `manager` and open the engine on it.
    pub fn from_manager(
        manager: &DictionaryManager,
        version: &DictionaryVersion,
        user_dictionary: Option<&Path>,
    ) -> DictionaryResult<Self> {
        let user_dictionary = user_dictionary.map(UserDictionary::new).transpose()?;
        let dictionary = manager.acquire_from_env(version)?.into_path_buf();

        Self::new(EngineConfig {
            dictionary,
            user_dictionary,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn run_frontend(&self, text: &str) -> DictionaryResult<Vec<NjdFeature>> {
        self.frontend.run_frontend(text).map_err(engine_error)
    }

    pub fn make_label(&self, features: &[NjdFeature]) -> DictionaryResult<Vec<String>> {
        self.frontend.make_label(features).map_err(engine_error)
    }

    pub fn extract_fullcontext(&self, text: &str) -> DictionaryResult<Vec<String>> {
        self.frontend.extract_fullcontext(text).map_err(engine_error)
    }

    /// Phonemes (`kana == false`) or kana readings of `text`.
    ///
    /// Joined output separates phonemes with a space and concatenates kana.
    pub fn g2p(&self, text: &str, kana: bool, join: bool) -> DictionaryResult<G2pOutput> {
        if kana {
            let features = self.run_frontend(text)?;
            Ok(G2pOutput::from_units(g2p::kana_units(&features), join, ""))
        } else {
            let labels = self.extract_fullcontext(text)?;
            let units = g2p::phoneme_units(&labels).map_err(DictionaryError::Engine)?;
            Ok(G2pOutput::from_units(units, join, " "))
        }
    }
}

/// Acquire `version` using the environment's configuration and open the engine.
///
/// `JPREPROCESS_DICT_PATH`, `JPREPROCESS_DICT_DIR` and `JPREPROCESS_DICT_URL`
/// are honoured.
pub fn jpreprocess<F: Frontend>(
    version: &DictionaryVersion,
    user_dictionary: Option<&Path>,
) -> DictionaryResult<JPreprocess<F>> {
    let manager = DictionaryManager::new(DictionaryConfig::from_env())?;
    JPreprocess::from_manager(&manager, version, user_dictionary)
}
