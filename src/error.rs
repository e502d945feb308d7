//! Failure kinds for every stage of the pipeline.
//!
//! Each stage returns its own error enum so callers can match on the kind of
//! failure: a malformed request, audio that cannot be processed, or an engine
//! that failed while producing speech.

use std::path::PathBuf;
use thiserror::Error;

/// A [`crate::request::ConversionRequest`] could not be constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Text cannot be empty or whitespace only")]
    EmptyText,

    #[error("Text is {len} characters; the limit is {max}")]
    TextTooLong { len: usize, max: usize },

    #[error("Language '{code}' not supported. Choose from: {supported}")]
    UnsupportedLanguage { code: String, supported: String },

    #[error("Language '{code}' is not supported by model {model}")]
    LanguageNotSupportedByModel { code: String, model: String },

    #[error("Speed {speed} is outside the supported range 0.5-2.0")]
    SpeedOutOfRange { speed: f32 },
}

/// Audio that cannot be read, decoded, converted, or written.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Could not open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("{path} contains no audio samples")]
    Empty { path: PathBuf },

    #[error("Invalid sample rate {rate} Hz")]
    InvalidSampleRate { rate: u32 },

    #[error("Channel layout error: {0}")]
    Channels(String),

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("Could not write {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Format '{0}' not supported. Choose from: mp3, wav, ogg, flac, m4a")]
    UnsupportedFormat(String),
}

/// The external synthesis engine failed or refused the call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No engine named '{0}' is configured")]
    UnknownEngine(String),

    #[error("Model {model} does not support voice cloning")]
    CloningUnsupported { model: String },

    #[error("Model {model} does not support language '{language}'")]
    LanguageUnsupported { model: String, language: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Engine finished but did not write {0}")]
    MissingOutput(PathBuf),

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}
