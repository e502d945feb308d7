//! Reference-audio normalization to the format cloning models expect.

use crate::audio::buffer::AudioBuffer;
use crate::audio::io::AudioIo;
use crate::audio::resample::AudioResampler;
use crate::error::AudioError;
use crate::naming;
use crate::perf::{self, Metric};
use std::path::{Path, PathBuf};
use tracing::info;

/// Sample rate of every normalized reference clip.
pub const TARGET_SAMPLE_RATE: u32 = 22_050;

/// A normalized clip written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReference {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub frames: usize,
    pub source_sample_rate: u32,
    pub source_channels: usize,
}

impl NormalizedReference {
    pub fn duration_seconds(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Writes mono 22,050 Hz copies of reference clips into `output_dir`.
#[derive(Debug, Clone)]
pub struct Normalizer {
    output_dir: PathBuf,
}

impl Normalizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Decode `input`, mix to mono, resample to [`TARGET_SAMPLE_RATE`], and
    /// write the result to a fresh `processed_ref_<timestamp>.wav`.
    ///
    /// The input file is never modified. Any error means there is no usable
    /// reference and synthesis must not proceed.
    pub fn normalize(&self, input: impl AsRef<Path>) -> Result<NormalizedReference, AudioError> {
        let input = input.as_ref();
        let _span = perf::span(Metric::Normalize);
        let source = AudioIo::read_audio(input)?;
        let source_sample_rate = source.sample_rate();
        let source_channels = source.channel_count();

        let normalized = normalize_buffer(source)?;
        let path = naming::unique_path(&self.output_dir, "processed_ref", "wav");
        AudioIo::write_wav(&path, &normalized)?;
        info!("Reference audio processed: {}", path.display());

        Ok(NormalizedReference {
            path,
            sample_rate: normalized.sample_rate(),
            frames: normalized.frames(),
            source_sample_rate,
            source_channels,
        })
    }
}

/// In-memory normalization: mono mix then band-limited resampling.
pub fn normalize_buffer(buffer: AudioBuffer) -> Result<AudioBuffer, AudioError> {
    let mono = buffer.to_mono();
    AudioResampler::resample(mono, TARGET_SAMPLE_RATE)
}
