//! End-to-end synthesis: validate, normalize, then call an engine.
//!
//! Every failure comes back as a [`SynthesisError`] variant; nothing is
//! retried and no failure escapes as a panic.

use crate::engine::SynthesisEngine;
use crate::error::{AudioError, EngineError, RequestError};
use crate::naming;
use crate::normalize::Normalizer;
use crate::request::{ConversionRequest, TextOverflow};
use crate::validate::{validate_reference, ReferenceLimits, ValidationReport};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The reference audio could not be read or normalized.
    #[error("Could not process the reference audio: {0}")]
    Audio(#[from] AudioError),

    /// The reference audio was readable but failed validation.
    #[error("Reference audio rejected: {}", .0.message)]
    Rejected(ValidationReport),

    #[error("Failed to convert text to speech: {0}")]
    Engine(#[from] EngineError),
}

/// A synthesized file on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutput {
    pub path: PathBuf,
    pub model: String,
    pub message: String,
}

/// Owns the output and scratch directories for a run.
#[derive(Debug, Clone)]
pub struct SpeechService {
    output_dir: PathBuf,
    normalizer: Normalizer,
    reference_limits: ReferenceLimits,
    overflow: TextOverflow,
}

impl SpeechService {
    /// Create the service, making sure both directories exist.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
        reference_limits: ReferenceLimits,
        overflow: TextOverflow,
    ) -> std::io::Result<Self> {
        let output_dir = output_dir.into();
        let temp_dir = temp_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        std::fs::create_dir_all(&temp_dir)?;
        Ok(Self {
            output_dir,
            normalizer: Normalizer::new(temp_dir),
            reference_limits,
            overflow,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn reference_limits(&self) -> &ReferenceLimits {
        &self.reference_limits
    }

    /// Build a request validated against what `engine` accepts.
    pub fn request_for<E: SynthesisEngine + ?Sized>(
        &self,
        engine: &E,
        text: &str,
        language: &str,
    ) -> Result<ConversionRequest, RequestError> {
        let descriptor = engine.descriptor();
        let limits = descriptor.request_limits(self.overflow);
        match ConversionRequest::new(text, language, &limits) {
            Err(RequestError::UnsupportedLanguage { code, .. })
                if code.parse::<crate::language::Language>().is_ok() =>
            {
                Err(RequestError::LanguageNotSupportedByModel {
                    code,
                    model: descriptor.id.clone(),
                })
            }
            other => other,
        }
    }

    /// Plain text-to-speech with no reference voice.
    pub fn synthesize<E: SynthesisEngine + ?Sized>(
        &self,
        engine: &E,
        request: &ConversionRequest,
    ) -> Result<SynthesisOutput, SynthesisError> {
        let descriptor = engine.descriptor();
        info!(
            "Converting text to speech: {} characters",
            request.text().chars().count()
        );
        let output = naming::unique_path(
            &self.output_dir,
            descriptor.output_prefix(),
            descriptor.output_format.extension(),
        );
        engine.synthesize(request, None, &output).map_err(|e| {
            error!("Error in text to speech: {e}");
            discard(&output);
            SynthesisError::Engine(e)
        })?;
        Ok(SynthesisOutput {
            path: output,
            model: descriptor.id.clone(),
            message: "Text converted to speech successfully".to_string(),
        })
    }

    /// Speak `request` in the voice of `reference`.
    ///
    /// The reference is validated, then normalized to mono 22,050 Hz; the
    /// engine only runs when both succeed. The normalized copy is scratch and
    /// is removed once the engine returns.
    pub fn clone_voice<E: SynthesisEngine + ?Sized>(
        &self,
        engine: &E,
        request: &ConversionRequest,
        reference: &Path,
    ) -> Result<SynthesisOutput, SynthesisError> {
        let descriptor = engine.descriptor();
        engine.check_request(request, Some(reference))?;
        info!("Cloning voice: {} characters", request.text().chars().count());

        let report = validate_reference(reference, &self.reference_limits)?;
        if !report.is_valid {
            return Err(SynthesisError::Rejected(report));
        }
        let processed = self.normalizer.normalize(reference)?;

        let output = naming::unique_path(
            &self.output_dir,
            "cloned_voice",
            descriptor.output_format.extension(),
        );
        let result = engine.synthesize(request, Some(&processed.path), &output);
        discard(&processed.path);
        result.map_err(|e| {
            error!("Error in voice cloning: {e}");
            discard(&output);
            SynthesisError::Engine(e)
        })?;
        info!("Cloned voice saved to: {}", output.display());
        Ok(SynthesisOutput {
            path: output,
            model: descriptor.id.clone(),
            message: "Voice cloned successfully".to_string(),
        })
    }
}

/// Remove a file the run produced but will not hand back.
fn discard(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {e}", path.display()),
    }
}
