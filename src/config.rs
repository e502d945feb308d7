//! Application configuration.
//!
//! Loaded from YAML with [`load_config`]. Every field has a default, so an
//! empty file (or no file at all) is a valid configuration.

use crate::audio::convert::AudioConverter;
use crate::engine::{CommandEngineConfig, EngineSet};
use crate::request::TextOverflow;
use crate::service::SpeechService;
use crate::validate::ReferenceLimits;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// # Example YAML
///
/// ```yaml
/// output_directory: outputs
/// temp_directory: temp
/// text_overflow: reject
/// ffmpeg_path: /opt/homebrew/bin/ffmpeg
/// reference: { min_seconds: 3.0, max_seconds: 30.0 }
/// engines:
///   coqui:
///     model: tts_models/multilingual/multi-dataset/your_tts
///     program: tts
///     args: ["--model_name", "{model}", "--text", "{text}", "--out_path", "{output}"]
///     reference_args: ["--speaker_wav", "{reference}"]
///     language_args: ["--language_idx", "{language}"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Where synthesized speech is written.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
    /// Where normalized reference clips are written.
    #[serde(default = "default_temp_directory")]
    pub temp_directory: PathBuf,
    /// Over-length text handling, applied to every request.
    #[serde(default)]
    pub text_overflow: TextOverflow,
    /// ffmpeg binary used to encode non-WAV output.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Accepted reference-audio duration.
    #[serde(default)]
    pub reference: ReferenceLimits,
    /// External synthesis engines by name.
    #[serde(default)]
    pub engines: BTreeMap<String, CommandEngineConfig>,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_temp_directory() -> PathBuf {
    PathBuf::from("temp")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            temp_directory: default_temp_directory(),
            text_overflow: TextOverflow::default(),
            ffmpeg_path: default_ffmpeg_path(),
            reference: ReferenceLimits::default(),
            engines: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Build the speech service, creating its directories.
    pub fn service(&self) -> std::io::Result<SpeechService> {
        SpeechService::new(
            &self.output_directory,
            &self.temp_directory,
            self.reference,
            self.text_overflow,
        )
    }

    pub fn engines(&self) -> EngineSet {
        EngineSet::from_configs(&self.engines)
    }

    pub fn converter(&self) -> AudioConverter {
        AudioConverter::new(&self.ffmpeg_path)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let limits = &self.reference;
        if !(limits.min_seconds >= 0.0 && limits.min_seconds <= limits.max_seconds) {
            anyhow::bail!(
                "reference limits must satisfy 0 <= min_seconds <= max_seconds (got {} and {})",
                limits.min_seconds,
                limits.max_seconds
            );
        }
        for (name, engine) in &self.engines {
            if engine.program.trim().is_empty() {
                anyhow::bail!("engine '{name}' has an empty program");
            }
        }
        Ok(())
    }
}

/// Load configuration from a YAML file.
///
/// Relative directories are resolved against the file's location.
///
/// # Errors
///
/// Returns an error if the file doesn't exist, contains invalid YAML, or
/// declares inconsistent limits.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }

    let data = fs::read_to_string(path)?;
    let mut config: AppConfig = if data.trim().is_empty() {
        AppConfig::default()
    } else {
        serde_yaml::from_str(&data)?
    };
    config.output_directory = resolve_relative_path(path, &config.output_directory);
    config.temp_directory = resolve_relative_path(path, &config.temp_directory);
    config.validate()?;
    Ok(config)
}

/// Resolve a possibly relative path against a config file location.
pub fn resolve_relative_path(config_path: &Path, maybe_relative: &Path) -> PathBuf {
    if maybe_relative.is_absolute() {
        return maybe_relative.to_path_buf();
    }
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(maybe_relative)
}
