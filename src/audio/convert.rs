//! Format conversion and simple clip editing.
//!
//! Every public operation on [`AudioConverter`] reports success as a `bool`
//! and logs the outcome. Decoding is native; WAV output is written directly
//! and the compressed formats are encoded by an external `ffmpeg` binary.

use crate::audio::buffer::AudioBuffer;
use crate::audio::format::AudioFormat;
use crate::audio::io::AudioIo;
use crate::audio::resample::AudioResampler;
use crate::error::AudioError;
use crate::perf::{self, Metric};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info};

/// Peak level targeted by [`AudioConverter::peak_normalize`] (about -1 dBFS).
pub const TARGET_PEAK: f32 = 0.9;

pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.01;
pub const DEFAULT_MIN_SILENCE_MS: u32 = 500;
pub const DEFAULT_MP3_BITRATE: &str = "192k";

/// Summary of a file on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_seconds: f64,
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
}

/// Read sample rate, channel count, duration, and size of an audio file.
pub fn audio_info(path: impl AsRef<Path>) -> Result<AudioInfo, AudioError> {
    let path = path.as_ref();
    let buffer = AudioIo::read_audio(path)?;
    let file_size_bytes = std::fs::metadata(path)
        .map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    Ok(AudioInfo {
        sample_rate: buffer.sample_rate(),
        channels: buffer.channel_count(),
        duration_seconds: round2(buffer.duration_seconds()),
        file_size_bytes,
        file_size_mb: round2(file_size_bytes as f64 / (1024.0 * 1024.0)),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Linear factor for a gain in decibels.
pub fn db_to_gain(gain_db: f32) -> f32 {
    10f32.powf(gain_db / 20.0)
}

pub fn apply_gain(buffer: &mut AudioBuffer, gain_db: f32) {
    buffer.scale(db_to_gain(gain_db));
}

/// Scale so the absolute peak equals [`TARGET_PEAK`]. Silence is left as is.
pub fn peak_normalize_buffer(buffer: &mut AudioBuffer) {
    let peak = buffer.peak();
    if peak > 0.0 {
        buffer.scale(TARGET_PEAK / peak);
    }
}

/// Frame range left after removing leading and trailing silence.
///
/// A frame is silent when every channel is below `threshold` in absolute
/// value. A silent run at either edge is removed only if it lasts at least
/// `min_silence_frames`.
pub fn silence_bounds(
    buffer: &AudioBuffer,
    threshold: f32,
    min_silence_frames: usize,
) -> (usize, usize) {
    let frames = buffer.frames();
    let loud = |idx: usize| {
        buffer
            .channels()
            .iter()
            .any(|channel| channel[idx].abs() >= threshold)
    };
    let lead = (0..frames).find(|&idx| loud(idx)).unwrap_or(frames);
    if lead == frames {
        // Entirely silent.
        return if frames >= min_silence_frames {
            (0, 0)
        } else {
            (0, frames)
        };
    }
    let trail = frames - (0..frames).rev().find(|&idx| loud(idx)).map_or(0, |idx| idx + 1);
    let start = if lead >= min_silence_frames { lead } else { 0 };
    let end = if trail >= min_silence_frames {
        frames - trail
    } else {
        frames
    };
    (start, end)
}

/// Concatenate clips after bringing them to the highest rate and channel count.
pub fn merge_buffers(clips: Vec<AudioBuffer>) -> Result<AudioBuffer, AudioError> {
    let rate = clips
        .iter()
        .map(AudioBuffer::sample_rate)
        .max()
        .ok_or_else(|| AudioError::Channels("no clips to merge".into()))?;
    let channels = clips.iter().map(AudioBuffer::channel_count).max().unwrap_or(1);
    let mut merged = AudioBuffer::new(vec![Vec::new(); channels], rate)?;
    for clip in clips {
        let clip = AudioResampler::convert_audio(clip, rate, channels)?;
        merged.append(&clip)?;
    }
    Ok(merged)
}

/// Format conversion front-end; holds the path of the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct AudioConverter {
    ffmpeg: PathBuf,
}

impl Default for AudioConverter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl AudioConverter {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Convert `input` to `output`, inferring the format from the output
    /// extension when `format` is `None`.
    pub fn convert_format(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        format: Option<AudioFormat>,
    ) -> bool {
        let (input, output) = (input.as_ref(), output.as_ref());
        let result = (|| {
            let format = match format {
                Some(format) => format,
                None => AudioFormat::from_path(output)?,
            };
            let buffer = AudioIo::read_audio(input)?;
            self.write_audio(output, &buffer, format, None)
        })();
        report(
            result,
            format!("Converted {} to {}", input.display(), output.display()),
            "converting audio",
        )
    }

    pub fn mp3_to_wav(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> bool {
        self.convert_format(input, output, Some(AudioFormat::Wav))
    }

    pub fn wav_to_mp3(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        bitrate: &str,
    ) -> bool {
        let (input, output) = (input.as_ref(), output.as_ref());
        let result = AudioIo::read_wav(input)
            .and_then(|buffer| self.write_audio(output, &buffer, AudioFormat::Mp3, Some(bitrate)));
        report(
            result,
            format!("Converted {} to {}", input.display(), output.display()),
            "converting to MP3",
        )
    }

    /// Change loudness by `gain_db` decibels.
    pub fn change_volume(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        gain_db: f32,
    ) -> bool {
        let output = output.as_ref();
        let result = self.edit(input.as_ref(), output, |buffer| {
            apply_gain(buffer, gain_db);
            Ok(())
        });
        report(
            result,
            format!("Volume adjusted audio saved to: {}", output.display()),
            "changing volume",
        )
    }

    /// Remove leading and trailing silence.
    pub fn trim_silence(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        threshold: f32,
        min_silence_ms: u32,
    ) -> bool {
        let output = output.as_ref();
        let result = self.edit(input.as_ref(), output, |buffer| {
            let min_frames =
                (buffer.sample_rate() as u64 * min_silence_ms as u64 / 1000) as usize;
            let (start, end) = silence_bounds(buffer, threshold, min_frames);
            buffer.slice_frames(start, end);
            Ok(())
        });
        report(
            result,
            format!("Trimmed audio saved to: {}", output.display()),
            "trimming silence",
        )
    }

    /// Scale to a -1 dBFS peak.
    pub fn peak_normalize(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> bool {
        let output = output.as_ref();
        let result = self.edit(input.as_ref(), output, |buffer| {
            peak_normalize_buffer(buffer);
            Ok(())
        });
        report(
            result,
            format!("Normalized audio saved to: {}", output.display()),
            "normalizing audio",
        )
    }

    pub fn merge_audio<P: AsRef<Path>>(&self, inputs: &[P], output: impl AsRef<Path>) -> bool {
        let output = output.as_ref();
        let result = (|| {
            let format = AudioFormat::from_path(output)?;
            let clips = inputs
                .iter()
                .map(|path| AudioIo::read_audio(path))
                .collect::<Result<Vec<_>, _>>()?;
            let merged = merge_buffers(clips)?;
            self.write_audio(output, &merged, format, None)
        })();
        report(
            result,
            format!("Merged audio saved to: {}", output.display()),
            "merging audio",
        )
    }

    fn edit(
        &self,
        input: &Path,
        output: &Path,
        op: impl FnOnce(&mut AudioBuffer) -> Result<(), AudioError>,
    ) -> Result<(), AudioError> {
        let format = AudioFormat::from_path(output)?;
        let mut buffer = AudioIo::read_audio(input)?;
        op(&mut buffer)?;
        self.write_audio(output, &buffer, format, None)
    }

    /// Encode `buffer` to `path`. WAV is written natively; other formats are
    /// staged as WAV and handed to ffmpeg.
    pub fn write_audio(
        &self,
        path: &Path,
        buffer: &AudioBuffer,
        format: AudioFormat,
        bitrate: Option<&str>,
    ) -> Result<(), AudioError> {
        let _span = perf::span(Metric::Encode);
        if format == AudioFormat::Wav {
            return AudioIo::write_wav(path, buffer);
        }

        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("audio");
        let staging = path.with_file_name(format!(".{stem}.staging.wav"));
        AudioIo::write_wav(&staging, buffer)?;

        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(&staging)
            .args(format.ffmpeg_args());
        if let Some(bitrate) = bitrate {
            command.args(["-b:a", bitrate]);
        }
        command.arg(path);
        let result = command.output();
        let _ = std::fs::remove_file(&staging);

        let encode_err = |reason: String| AudioError::Encode {
            path: path.to_path_buf(),
            reason,
        };
        let output = result.map_err(|e| {
            encode_err(format!("failed to run {}: {e}", self.ffmpeg.display()))
        })?;
        if !output.status.success() {
            return Err(encode_err(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

fn report(result: Result<(), AudioError>, success: String, action: &str) -> bool {
    match result {
        Ok(()) => {
            info!("{success}");
            true
        }
        Err(e) => {
            error!("Error {action}: {e}");
            false
        }
    }
}
