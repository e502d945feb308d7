use crate::audio::buffer::AudioBuffer;
use crate::error::AudioError;
use crate::perf::{self, Metric};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Full-scale value used for both reading and writing 16-bit PCM, so a
/// written file reads back to the exact samples it was written from.
const PCM16_SCALE: f32 = 32768.0;

#[derive(Debug, Default)]
pub struct AudioIo;

impl AudioIo {
    /// Decode any supported file into per-channel samples.
    ///
    /// WAV files go through `hound`; everything else is probed by `symphonia`.
    pub fn read_audio(path: impl AsRef<Path>) -> Result<AudioBuffer, AudioError> {
        let path = path.as_ref();
        let _span = perf::span(Metric::Decode);
        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| AudioError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if len == 0 {
            return Err(AudioError::Decode {
                path: path.to_path_buf(),
                reason: "file is empty".into(),
            });
        }

        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        // hound only reads integer and 32-bit float PCM; other WAV encodings
        // (mu-law, A-law, 64-bit float) go through symphonia like any other
        // container, so the outcome depends on the bytes and not the name.
        let buffer = if is_wav {
            match Self::read_wav(path) {
                Ok(buffer) => buffer,
                Err(err) => {
                    debug!(path = %path.display(), "hound rejected WAV, retrying: {err}");
                    Self::decode_with_symphonia(path, file)?
                }
            }
        } else {
            Self::decode_with_symphonia(path, file)?
        };
        perf::add_count(Metric::DecodedFrames, buffer.frames() as u64);
        Ok(buffer)
    }

    pub fn read_wav(path: impl AsRef<Path>) -> Result<AudioBuffer, AudioError> {
        let path = path.as_ref();
        let decode_err = |err: hound::Error| AudioError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };
        let mut reader = WavReader::open(path).map_err(decode_err)?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(AudioError::Channels("WAV header declares zero channels".into()));
        }
        let mut samples = vec![Vec::new(); channels];

        match spec.sample_format {
            SampleFormat::Float => {
                for (idx, sample) in reader.samples::<f32>().enumerate() {
                    samples[idx % channels].push(sample.map_err(decode_err)?);
                }
            }
            SampleFormat::Int => {
                let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                for (idx, sample) in reader.samples::<i32>().enumerate() {
                    let value = sample.map_err(decode_err)? as f32 / max;
                    samples[idx % channels].push(value);
                }
            }
        }

        // A truncated final frame leaves channels uneven; drop the partial frame.
        let frames = samples.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut samples {
            channel.truncate(frames);
        }
        AudioBuffer::new(samples, spec.sample_rate)
    }

    fn decode_with_symphonia(path: &Path, file: File) -> Result<AudioBuffer, AudioError> {
        let decode_err = |reason: String| AudioError::Decode {
            path: path.to_path_buf(),
            reason,
        };
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| decode_err(format!("unrecognized format: {e}")))?;
        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| decode_err("no decodable audio track".into()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| decode_err(format!("unsupported codec: {e}")))?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut failed_packets = 0_usize;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(decode_err(format!("failed to read packet: {e}"))),
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(_)) => {
                    failed_packets += 1;
                    continue;
                }
                Err(e) => return Err(decode_err(format!("failed to decode packet: {e}"))),
            };
            let spec = *decoded.spec();
            channels = spec.channels.count();
            sample_rate = spec.rate;
            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(sample_buf.samples());
        }

        deinterleave(path, &interleaved, channels, sample_rate, failed_packets)
    }

    /// Write 16-bit PCM WAV with the same scale [`AudioIo::read_wav`] uses.
    pub fn write_wav(path: impl AsRef<Path>, buffer: &AudioBuffer) -> Result<(), AudioError> {
        let path = path.as_ref();
        let encode_err = |err: hound::Error| AudioError::Encode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };
        let spec = WavSpec {
            channels: buffer.channel_count() as u16,
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).map_err(encode_err)?;
        let channels = buffer.channels();
        for idx in 0..buffer.frames() {
            for channel in channels {
                let scaled = (channel[idx] * PCM16_SCALE)
                    .round()
                    .clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                writer.write_sample(scaled).map_err(encode_err)?;
            }
        }
        writer.finalize().map_err(encode_err)?;
        Ok(())
    }
}

/// Split decoded interleaved samples into channels. A stream whose every
/// packet failed to decode is `Empty`, not a zero-length clip.
fn deinterleave(
    path: &Path,
    interleaved: &[f32],
    channels: usize,
    sample_rate: u32,
    failed_packets: usize,
) -> Result<AudioBuffer, AudioError> {
    if interleaved.is_empty() && failed_packets > 0 {
        return Err(AudioError::Empty {
            path: path.to_path_buf(),
        });
    }
    if channels == 0 {
        return Err(AudioError::Decode {
            path: path.to_path_buf(),
            reason: "stream declares zero channels".into(),
        });
    }
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate { rate: 0 });
    }
    let mut samples = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (channel, value) in samples.iter_mut().zip(frame) {
            channel.push(*value);
        }
    }
    AudioBuffer::new(samples, sample_rate)
}
