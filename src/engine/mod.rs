//! Synthesis engines.
//!
//! An engine is passed explicitly to every synthesis call; nothing in the
//! crate caches a "current" model. Engines take `&self` and keep no per-call
//! state.

pub mod command;
pub mod models;

use crate::error::EngineError;
use crate::request::ConversionRequest;
use std::collections::BTreeMap;
use std::path::Path;

pub use command::{CommandEngine, CommandEngineConfig};
pub use models::{builtin_models, find_model, ModelDescriptor};

/// An external capability that turns text (and optionally a reference voice)
/// into an audio file at `output`.
pub trait SynthesisEngine {
    fn descriptor(&self) -> &ModelDescriptor;

    fn synthesize(
        &self,
        request: &ConversionRequest,
        reference: Option<&Path>,
        output: &Path,
    ) -> Result<(), EngineError>;

    /// Refuse requests the model cannot serve before doing any work.
    fn check_request(
        &self,
        request: &ConversionRequest,
        reference: Option<&Path>,
    ) -> Result<(), EngineError> {
        let descriptor = self.descriptor();
        if reference.is_some() && !descriptor.voice_cloning {
            return Err(EngineError::CloningUnsupported {
                model: descriptor.id.clone(),
            });
        }
        if !descriptor.supports(request.language()) {
            return Err(EngineError::LanguageUnsupported {
                model: descriptor.id.clone(),
                language: request.language().code().to_string(),
            });
        }
        Ok(())
    }
}

/// Named engines from configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineSet {
    engines: BTreeMap<String, CommandEngine>,
}

impl EngineSet {
    pub fn from_configs(configs: &BTreeMap<String, CommandEngineConfig>) -> Self {
        let engines = configs
            .iter()
            .map(|(name, config)| (name.clone(), CommandEngine::new(config.clone())))
            .collect();
        Self { engines }
    }

    pub fn get(&self, name: &str) -> Result<&CommandEngine, EngineError> {
        self.engines
            .get(name)
            .ok_or_else(|| EngineError::UnknownEngine(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
