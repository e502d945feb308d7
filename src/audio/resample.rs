use crate::audio::buffer::AudioBuffer;
use crate::error::AudioError;
use crate::perf::{self, Metric};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const SINC_LEN: usize = 256;

#[derive(Debug, Default)]
pub struct AudioResampler;

impl AudioResampler {
    /// Convert channel count first, then sample rate.
    pub fn convert_audio(
        buffer: AudioBuffer,
        to_rate: u32,
        to_channels: usize,
    ) -> Result<AudioBuffer, AudioError> {
        let buffer = convert_channels(buffer, to_channels)?;
        Self::resample(buffer, to_rate)
    }

    /// Band-limited windowed-sinc resampling.
    ///
    /// The output holds `round(frames * to_rate / from_rate)` frames and stays
    /// time-aligned with the input.
    pub fn resample(buffer: AudioBuffer, to_rate: u32) -> Result<AudioBuffer, AudioError> {
        if to_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: to_rate });
        }
        let from_rate = buffer.sample_rate();
        if from_rate == to_rate {
            return Ok(buffer);
        }
        if buffer.is_empty() {
            return AudioBuffer::new(buffer.into_channels(), to_rate);
        }

        let _span = perf::span(Metric::Resample);
        let channels = buffer.channel_count();
        let input_len = buffer.frames();
        let ratio = to_rate as f64 / from_rate as f64;
        let expected = (input_len as f64 * ratio).round() as usize;
        let params = SincInterpolationParameters {
            sinc_len: SINC_LEN,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        let resample_err = |e: &dyn std::fmt::Display| AudioError::Resample(e.to_string());
        let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input_len, channels)
            .map_err(|e| resample_err(&e))?;
        debug!(from_rate, to_rate, input_len, "resampling");

        // The whole clip is one chunk, so the first sinc window is already
        // centred on input frame 0 and no leading frames are dropped. The
        // tail still sits in the filter history and comes out on flush.
        let mut output = resampler
            .process(buffer.channels(), None)
            .map_err(|e| resample_err(&e))?;
        let max_flushes = 2 + (2 * SINC_LEN).div_ceil(input_len);
        let mut flushes = 0;
        while output[0].len() < expected && flushes < max_flushes {
            let tail = resampler
                .process_partial::<Vec<f32>>(None, None)
                .map_err(|e| resample_err(&e))?;
            for (dst, src) in output.iter_mut().zip(tail) {
                dst.extend(src);
            }
            flushes += 1;
        }
        for channel in &mut output {
            channel.resize(expected, 0.0);
        }
        AudioBuffer::new(output, to_rate)
    }
}

/// Mix down to mono, duplicate mono to N channels, or pass through.
pub fn convert_channels(buffer: AudioBuffer, to_channels: usize) -> Result<AudioBuffer, AudioError> {
    let from_channels = buffer.channel_count();
    if from_channels == to_channels {
        return Ok(buffer);
    }
    if to_channels == 1 {
        return Ok(buffer.to_mono());
    }
    if from_channels == 1 && to_channels > 1 {
        let rate = buffer.sample_rate();
        let mono = buffer.into_channels().remove(0);
        return AudioBuffer::new(vec![mono; to_channels], rate);
    }
    Err(AudioError::Channels(format!(
        "unsupported channel conversion from {from_channels} to {to_channels}"
    )))
}
