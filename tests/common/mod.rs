//! Shared test utilities for generating WAV fixtures.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use ttspro::audio::io::AudioIo;
use ttspro::AudioBuffer;

/// Sine wave samples at `freq` Hz, amplitude 0.5.
pub fn sine(freq: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let frames = (seconds * sample_rate as f32).round() as usize;
    (0..frames)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Write a mono 440 Hz tone and return its path.
pub fn write_mono_tone(dir: &Path, name: &str, seconds: f32, sample_rate: u32) -> PathBuf {
    let path = dir.join(name);
    let buffer = AudioBuffer::mono(sine(440.0, seconds, sample_rate), sample_rate)
        .expect("build mono buffer");
    AudioIo::write_wav(&path, &buffer).expect("write mono wav");
    path
}

/// Write a stereo clip with different tones per channel and return its path.
pub fn write_stereo_tone(dir: &Path, name: &str, seconds: f32, sample_rate: u32) -> PathBuf {
    let path = dir.join(name);
    let buffer = AudioBuffer::new(
        vec![
            sine(440.0, seconds, sample_rate),
            sine(220.0, seconds, sample_rate),
        ],
        sample_rate,
    )
    .expect("build stereo buffer");
    AudioIo::write_wav(&path, &buffer).expect("write stereo wav");
    path
}

/// Mono tone padded with `pad_seconds` of silence on both sides.
pub fn write_padded_tone(dir: &Path, name: &str, pad_seconds: f32, sample_rate: u32) -> PathBuf {
    let path = dir.join(name);
    let pad = vec![0.0; (pad_seconds * sample_rate as f32) as usize];
    let mut samples = pad.clone();
    samples.extend(sine(440.0, 1.0, sample_rate));
    samples.extend(pad);
    let buffer = AudioBuffer::mono(samples, sample_rate).expect("build padded buffer");
    AudioIo::write_wav(&path, &buffer).expect("write padded wav");
    path
}

/// Number of regular files directly under `dir`.
pub fn file_count(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .count(),
        Err(_) => 0,
    }
}
