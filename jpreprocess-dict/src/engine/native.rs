//! [`Frontend`] backed by the `jpreprocess` crate.

use jpreprocess::{
    DefaultFetcher, DictionaryKind, JPreprocessConfig, SystemDictionaryConfig,
    UserDictionaryConfig,
};

use super::{EngineConfig, Frontend, NjdFeature};
use crate::error::DictionaryError;

fn engine_error<E: std::fmt::Display>(e: E) -> DictionaryError {
    DictionaryError::Engine(e.to_string())
}

/// The jpreprocess engine opened on a `naist-jdic` directory.
pub struct NativeFrontend {
    inner: jpreprocess::JPreprocess<DefaultFetcher>,
}

impl std::fmt::Debug for NativeFrontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFrontend").finish_non_exhaustive()
    }
}

impl Frontend for NativeFrontend {
    type Error = DictionaryError;

    fn open(config: &EngineConfig) -> Result<Self, Self::Error> {
        // User dictionaries are read as IPADIC-layout sources.
        let user_dictionary = config
            .user_dictionary
            .as_ref()
            .map(|user| UserDictionaryConfig {
                path: user.path().to_path_buf(),
                kind: Some(DictionaryKind::IPADIC),
            });

        let inner = jpreprocess::JPreprocess::from_config(JPreprocessConfig {
            dictionary: SystemDictionaryConfig::File(config.dictionary.clone()),
            user_dictionary,
        })
        .map_err(engine_error)?;

        Ok(Self { inner })
    }

    fn run_frontend(&self, text: &str) -> Result<Vec<NjdFeature>, Self::Error> {
        self.inner
            .run_frontend(text)
            .map_err(engine_error)?
            .iter()
            .map(|line| NjdFeature::from_njd_line(line).map_err(DictionaryError::Engine))
            .collect()
    }

    fn make_label(&self, features: &[NjdFeature]) -> Result<Vec<String>, Self::Error> {
        let lines = features.iter().map(NjdFeature::to_njd_line).collect();
        Ok(self
            .inner
            .make_label(lines)
            .into_iter()
            .map(|label| label.to_string())
            .collect())
    }

    fn extract_fullcontext(&self, text: &str) -> Result<Vec<String>, Self::Error> {
        Ok(self
            .inner
            .extract_fullcontext(text)
            .map_err(engine_error)?
            .into_iter()
            .map(|label| label.to_string())
            .collect())
    }
}
