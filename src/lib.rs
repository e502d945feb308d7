//! # ttspro - reference-audio preparation and engine-backed speech synthesis
//!
//! The crate covers everything around a text-to-speech engine except the
//! acoustic model itself:
//!
//! 1. **Request validation** ([`ConversionRequest`]): text, language, and speed
//!    are checked before any engine is called.
//!
//! 2. **Validation Gate** ([`validate_reference`]): a reference voice clip is
//!    decoded and its duration checked (3-30 s by default). A clip that cannot
//!    be read is an error; a readable clip of the wrong length is a report
//!    with `is_valid == false`.
//!
//! 3. **Audio Normalizer** ([`Normalizer`]): the clip is mixed to mono and
//!    resampled to 22,050 Hz with a band-limited sinc resampler, then written
//!    to a fresh timestamped file.
//!
//! 4. **Engines** ([`SynthesisEngine`]): external programs that produce the
//!    speech. Each call receives the engine explicitly.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ttspro::engine::{CommandEngine, CommandEngineConfig};
//! use ttspro::engine::models::YOUR_TTS;
//! use ttspro::{load_config, SpeechService};
//! use std::path::Path;
//!
//! let config = load_config("ttspro.yaml").unwrap();
//! let service = config.service().unwrap();
//!
//! let mut engine_config = CommandEngineConfig::new(YOUR_TTS, "tts");
//! engine_config.args = vec!["--text".into(), "{text}".into(), "--out_path".into(), "{output}".into()];
//! engine_config.reference_args = vec!["--speaker_wav".into(), "{reference}".into()];
//! let engine = CommandEngine::new(engine_config);
//!
//! let request = service.request_for(&engine, "Hello world", "en").unwrap();
//! let output = service
//!     .clone_voice(&engine, &request, Path::new("my_voice.wav"))
//!     .unwrap();
//! println!("{}", output.path.display());
//! ```
//!
//! ## Format conversion
//!
//! [`audio::convert::AudioConverter`] converts between MP3, WAV, OGG, FLAC, and
//! M4A, adjusts gain, trims silence, and merges clips. Each operation returns a
//! `bool` and logs the outcome.

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod language;
pub mod naming;
pub mod normalize;
pub mod perf;
pub mod request;
pub mod service;
pub mod validate;

pub use audio::{AudioBuffer, AudioFormat, ChannelLayout};
pub use config::{load_config, AppConfig};
pub use engine::SynthesisEngine;
pub use error::{AudioError, EngineError, RequestError};
pub use language::Language;
pub use normalize::{Normalizer, NormalizedReference, TARGET_SAMPLE_RATE};
pub use request::{ConversionRequest, RequestLimits, TextOverflow};
pub use service::{SpeechService, SynthesisError, SynthesisOutput};
pub use validate::{validate_reference, DurationIssue, ReferenceLimits, ValidationReport};
