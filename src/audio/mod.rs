//! Audio I/O, resampling, and format conversion.
//!
//! These helpers keep waveform handling separate from validation and synthesis:
//! decoding files into [`buffer::AudioBuffer`], converting sample rates or
//! channel counts, and writing results back to disk.

pub mod buffer;
pub mod convert;
pub mod format;
pub mod io;
pub mod resample;

pub use buffer::{AudioBuffer, ChannelLayout};
pub use format::AudioFormat;
