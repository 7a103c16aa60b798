//! # dv-rs
//!
//! A Rust library for decoding D-STAR digital voice transmissions.
//!
//! ## Features
//!
//! - **Frame deinterleaving**: reorders the 72 interleaved bits of a
//!   received AMBE voice frame into the bit-plane layout the vocoder expects
//! - **Decode sessions**: per-channel decoder state with cumulative
//!   signal-quality reporting
//! - **DVTool files**: read and write recorded D-STAR streams
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! dv-rs = { version = "0.2", features = ["mbelib"] }
//! ```
//!
//! ```ignore
//! use std::path::Path;
//! use dv_rs::{DecodeSession, DecodedAudio, dvtool::DvStream, vocoders::mbe::MbeVocoder};
//!
//! let stream = DvStream::read_file(Path::new("recording.dvtool"))?;
//! let mut session = DecodeSession::new(MbeVocoder::new())?;
//!
//! let mut audio = DecodedAudio::new();
//! for frame in &stream.frames {
//!     audio.push_frame(&session.decode_bytes(&frame.voice)?);
//! }
//! audio.write_wav(Path::new("output.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod deinterleave;
pub mod dvtool;
pub mod error;
pub mod session;
pub mod vocoders;

pub use deinterleave::{deinterleave, DeinterleavedFrame, FRAME_BYTES};
pub use error::DvError;
pub use session::{
    DecodeSession, ErrorReport, FrameAudio, ParamSet, Vocoder, DEFAULT_QUALITY, SAMPLES_PER_FRAME,
    SAMPLE_RATE,
};

use std::path::Path;

/// Accumulated PCM output of a decoded transmission.
///
/// Contains raw i16 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct DecodedAudio {
    /// Raw audio samples as signed 16-bit values
    pub samples: Vec<i16>,
    /// Sample rate of the audio (8000 for D-STAR voice)
    pub sample_rate: u32,
}

impl Default for DecodedAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodedAudio {
    /// An empty buffer at the vocoder's 8 kHz output rate.
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            sample_rate: SAMPLE_RATE,
        }
    }

    /// Append one decoded frame's samples.
    pub fn push_frame(&mut self, frame: &FrameAudio) {
        self.samples.extend_from_slice(&frame.samples);
    }

    /// Write the audio to a 16-bit mono WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_counts_whole_frames() {
        let mut audio = DecodedAudio::new();
        audio.samples.resize(SAMPLES_PER_FRAME * 50, 0);
        // 50 frames of 20 ms each.
        assert!((audio.duration_secs() - 1.0).abs() < 1e-9);
    }
}
