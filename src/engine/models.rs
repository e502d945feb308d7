//! Known synthesis models and what they accept.

use crate::audio::format::AudioFormat;
use crate::language::Language;
use crate::request::{RequestLimits, TextOverflow, DEFAULT_MAX_TEXT_CHARS};
use serde::Serialize;

pub const GTTS: &str = "gtts";
pub const TACOTRON2_DDC: &str = "tts_models/en/ljspeech/tacotron2-DDC";
pub const GLOW_TTS: &str = "tts_models/en/ljspeech/glow-tts";
pub const YOUR_TTS: &str = "tts_models/multilingual/multi-dataset/your_tts";

/// Maximum text length for voice-cloning requests.
pub const CLONING_MAX_TEXT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub languages: Vec<Language>,
    pub voice_cloning: bool,
    pub max_text_chars: usize,
    pub output_format: AudioFormat,
}

impl ModelDescriptor {
    /// Descriptor for a model id missing from the registry: every language,
    /// no cloning, WAV output.
    pub fn generic(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: "Custom model".to_string(),
            languages: Language::ALL.to_vec(),
            voice_cloning: false,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            output_format: AudioFormat::Wav,
        }
    }

    pub fn supports(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    pub fn request_limits(&self, overflow: TextOverflow) -> RequestLimits {
        RequestLimits {
            max_chars: self.max_text_chars,
            overflow,
            languages: self.languages.clone(),
        }
    }

    /// File name prefix for synthesized output.
    pub fn output_prefix(&self) -> &'static str {
        if self.id == GTTS {
            "basic_tts"
        } else if self.id.contains("/multilingual/") {
            "multilingual_tts"
        } else {
            "advanced_tts"
        }
    }
}

/// Built-in model registry.
pub fn builtin_models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor {
            id: GTTS.to_string(),
            name: "Google TTS".to_string(),
            description: "Quick online synthesis".to_string(),
            languages: Language::ALL.to_vec(),
            voice_cloning: false,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            output_format: AudioFormat::Mp3,
        },
        ModelDescriptor {
            id: TACOTRON2_DDC.to_string(),
            name: "Tacotron2 DDC".to_string(),
            description: "High quality English TTS model".to_string(),
            languages: vec![Language::En],
            voice_cloning: false,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            output_format: AudioFormat::Wav,
        },
        ModelDescriptor {
            id: GLOW_TTS.to_string(),
            name: "Glow-TTS".to_string(),
            description: "Fast English TTS model".to_string(),
            languages: vec![Language::En],
            voice_cloning: false,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            output_format: AudioFormat::Wav,
        },
        ModelDescriptor {
            id: YOUR_TTS.to_string(),
            name: "YourTTS".to_string(),
            description: "Multilingual TTS with voice cloning support".to_string(),
            languages: Language::CLONING.to_vec(),
            voice_cloning: true,
            max_text_chars: CLONING_MAX_TEXT_CHARS,
            output_format: AudioFormat::Wav,
        },
    ]
}

pub fn find_model(id: &str) -> Option<ModelDescriptor> {
    builtin_models().into_iter().find(|model| model.id == id)
}
