use crate::error::AudioError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Container formats accepted for input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
    Flac,
    M4a,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Ogg,
        AudioFormat::Flac,
        AudioFormat::M4a,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::M4a => "m4a",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, AudioError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| AudioError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }

    /// ffmpeg muxer and codec names for this format.
    pub(crate) fn ffmpeg_args(&self) -> [&'static str; 4] {
        match self {
            AudioFormat::Mp3 => ["-f", "mp3", "-c:a", "libmp3lame"],
            AudioFormat::Wav => ["-f", "wav", "-c:a", "pcm_s16le"],
            AudioFormat::Ogg => ["-f", "ogg", "-c:a", "libvorbis"],
            AudioFormat::Flac => ["-f", "flac", "-c:a", "flac"],
            AudioFormat::M4a => ["-f", "ipod", "-c:a", "aac"],
        }
    }
}

impl FromStr for AudioFormat {
    type Err = AudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().trim_start_matches('.').to_ascii_lowercase();
        AudioFormat::ALL
            .into_iter()
            .find(|format| format.extension() == lowered)
            .ok_or_else(|| AudioError::UnsupportedFormat(value.to_string()))
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
