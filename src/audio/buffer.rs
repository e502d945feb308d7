use crate::error::AudioError;
use serde::Serialize;

/// Channel layout of a decoded clip, as reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    /// One channel is mono; anything wider is reported as stereo.
    pub fn from_count(channels: usize) -> Self {
        if channels > 1 {
            ChannelLayout::Stereo
        } else {
            ChannelLayout::Mono
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelLayout::Mono => "mono",
            ChannelLayout::Stereo => "stereo",
        }
    }
}

impl std::fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded audio held as one sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Build a buffer, checking that every channel has the same length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: sample_rate });
        }
        if channels.is_empty() {
            return Err(AudioError::Channels("no audio channels provided".into()));
        }
        let len = channels[0].len();
        if channels.iter().any(|channel| channel.len() != len) {
            return Err(AudioError::Channels("channel length mismatch".into()));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        Self::new(vec![samples], sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn layout(&self) -> ChannelLayout {
        ChannelLayout::from_count(self.channels.len())
    }

    /// Number of samples per channel.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Average all channels sample-wise into a single channel.
    pub fn to_mono(&self) -> AudioBuffer {
        if self.channels.len() == 1 {
            return self.clone();
        }
        let scale = 1.0 / self.channels.len() as f32;
        let mut mixed = vec![0.0_f32; self.frames()];
        for channel in &self.channels {
            for (acc, value) in mixed.iter_mut().zip(channel) {
                *acc += *value;
            }
        }
        for value in &mut mixed {
            *value *= scale;
        }
        AudioBuffer {
            channels: vec![mixed],
            sample_rate: self.sample_rate,
        }
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|channel| channel.iter())
            .fold(0.0_f32, |peak, value| peak.max(value.abs()))
    }

    /// Multiply every sample by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for channel in &mut self.channels {
            for value in channel.iter_mut() {
                *value *= factor;
            }
        }
    }

    /// Keep only frames in `start..end`.
    pub fn slice_frames(&mut self, start: usize, end: usize) {
        let end = end.min(self.frames());
        let start = start.min(end);
        for channel in &mut self.channels {
            channel.truncate(end);
            channel.drain(..start);
        }
    }

    /// Append another buffer with the same rate and channel count.
    pub fn append(&mut self, other: &AudioBuffer) -> Result<(), AudioError> {
        if other.sample_rate != self.sample_rate || other.channels.len() != self.channels.len() {
            return Err(AudioError::Channels(format!(
                "cannot append {} ch @ {} Hz to {} ch @ {} Hz",
                other.channels.len(),
                other.sample_rate,
                self.channels.len(),
                self.sample_rate
            )));
        }
        for (dst, src) in self.channels.iter_mut().zip(&other.channels) {
            dst.extend_from_slice(src);
        }
        Ok(())
    }
}
