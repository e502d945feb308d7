//! Validated synthesis requests.
//!
//! A [`ConversionRequest`] can only be obtained through its constructor, so an
//! engine never sees text or parameters that failed validation.

use crate::error::RequestError;
use crate::language::Language;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TEXT_CHARS: usize = 5000;
pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;

/// What to do with text longer than the limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOverflow {
    /// Fail with [`RequestError::TextTooLong`].
    #[default]
    Reject,
    /// Keep the first `max_chars` characters.
    Truncate,
}

/// Bounds a request is validated against.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLimits {
    pub max_chars: usize,
    pub overflow: TextOverflow,
    pub languages: Vec<Language>,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_TEXT_CHARS,
            overflow: TextOverflow::Reject,
            languages: Language::ALL.to_vec(),
        }
    }
}

impl RequestLimits {
    pub fn with_overflow(mut self, overflow: TextOverflow) -> Self {
        self.overflow = overflow;
        self
    }
}

/// Text plus synthesis options that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    text: String,
    language: Language,
    speed: Option<f32>,
    slow: bool,
}

impl ConversionRequest {
    /// Validate and build a request. Text is stored trimmed.
    pub fn new(text: &str, language: &str, limits: &RequestLimits) -> Result<Self, RequestError> {
        let language: Language = language.parse()?;
        if !limits.languages.contains(&language) {
            return Err(RequestError::UnsupportedLanguage {
                code: language.code().to_string(),
                supported: limits
                    .languages
                    .iter()
                    .map(Language::code)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RequestError::EmptyText);
        }
        let len = trimmed.chars().count();
        let text = if len > limits.max_chars {
            match limits.overflow {
                TextOverflow::Reject => {
                    return Err(RequestError::TextTooLong {
                        len,
                        max: limits.max_chars,
                    })
                }
                TextOverflow::Truncate => {
                    let truncated: String = trimmed.chars().take(limits.max_chars).collect();
                    // Truncation can expose trailing whitespace.
                    truncated.trim_end().to_string()
                }
            }
        } else {
            trimmed.to_string()
        };
        if text.is_empty() {
            return Err(RequestError::EmptyText);
        }

        Ok(Self {
            text,
            language,
            speed: None,
            slow: false,
        })
    }

    /// Set a speech speed multiplier in `[0.5, 2.0]`.
    pub fn with_speed(mut self, speed: f32) -> Result<Self, RequestError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(RequestError::SpeedOutOfRange { speed });
        }
        self.speed = Some(speed);
        Ok(self)
    }

    pub fn with_slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn speed(&self) -> Option<f32> {
        self.speed
    }

    pub fn slow(&self) -> bool {
        self.slow
    }
}
