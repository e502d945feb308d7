//! Reference-audio gate run before any normalization or synthesis.
//!
//! [`validate_reference`] separates two outcomes: a file that cannot be read
//! at all (`Err`) and a readable file whose duration is out of range
//! (`Ok` with `is_valid == false`).

use crate::audio::buffer::{AudioBuffer, ChannelLayout};
use crate::audio::io::AudioIo;
use crate::error::AudioError;
use crate::perf::{self, Metric};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Accepted reference duration, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceLimits {
    #[serde(default = "default_min_seconds")]
    pub min_seconds: f64,
    #[serde(default = "default_max_seconds")]
    pub max_seconds: f64,
}

fn default_min_seconds() -> f64 {
    3.0
}

fn default_max_seconds() -> f64 {
    30.0
}

impl Default for ReferenceLimits {
    fn default() -> Self {
        Self {
            min_seconds: default_min_seconds(),
            max_seconds: default_max_seconds(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationIssue {
    TooShort,
    TooLong,
}

/// Outcome of validating a readable reference clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channel_layout: ChannelLayout,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<DurationIssue>,
}

impl ReferenceLimits {
    /// Classify an already-decoded clip.
    pub fn check(&self, buffer: &AudioBuffer) -> ValidationReport {
        // Duration and layout come from the source; the mono mix is only
        // used so multi-channel clips report the same frame count.
        let layout = buffer.layout();
        let mono = buffer.to_mono();
        let duration = mono.duration_seconds();

        let issue = if duration < self.min_seconds {
            Some(DurationIssue::TooShort)
        } else if duration > self.max_seconds {
            Some(DurationIssue::TooLong)
        } else {
            None
        };
        let message = match issue {
            None => "Audio is valid".to_string(),
            Some(DurationIssue::TooShort) => format!(
                "Audio is {duration:.2}s, shorter than the {}s minimum",
                self.min_seconds
            ),
            Some(DurationIssue::TooLong) => format!(
                "Audio is {duration:.2}s, longer than the {}s maximum",
                self.max_seconds
            ),
        };

        ValidationReport {
            is_valid: issue.is_none(),
            duration_seconds: duration,
            sample_rate: buffer.sample_rate(),
            channel_layout: layout,
            message,
            issue,
        }
    }
}

/// Read a reference clip and check its duration against `limits`.
pub fn validate_reference(
    path: impl AsRef<Path>,
    limits: &ReferenceLimits,
) -> Result<ValidationReport, AudioError> {
    let path = path.as_ref();
    let _span = perf::span(Metric::Validate);
    let buffer = AudioIo::read_audio(path)?;
    let report = limits.check(&buffer);
    info!(
        path = %path.display(),
        duration = report.duration_seconds,
        valid = report.is_valid,
        "validated reference audio"
    );
    Ok(report)
}
