//! Per-channel voice decode state.
//!
//! A [`DecodeSession`] owns everything the vocoder needs to carry across
//! successive frames of one transmission: the current/previous/
//! previous-enhanced model parameter sets, the output sample buffer, the
//! cumulative error counters, and the unvoiced-quality setting. The vocoder
//! itself is a black box behind the [`Vocoder`] trait; this module only
//! guarantees that its state is threaded through correctly, one frame at a
//! time, in transmission order.

use crate::deinterleave::DeinterleavedFrame;
use crate::error::DvError;

/// PCM samples produced per decoded frame (20 ms at 8 kHz).
pub const SAMPLES_PER_FRAME: usize = 160;

/// Output sample rate of the vocoder.
pub const SAMPLE_RATE: u32 = 8000;

/// Default unvoiced-speech quality setting.
pub const DEFAULT_QUALITY: i32 = 3;

/// Length of the per-call data-bit scratch buffer the decode routine
/// expects alongside the bit-plane matrix.
pub const AMBE_DATA_BITS: usize = 49;

/// The three model-parameter sets a session threads through every decode
/// call. The vocoder rotates them forward as part of advancing a frame;
/// nothing else may touch them.
pub struct ParamSet<P> {
    pub current: P,
    pub previous: P,
    pub previous_enhanced: P,
}

/// External vocoder capability.
///
/// Implementations wrap a decode routine that reconstructs model parameters
/// from one deinterleaved frame and synthesizes 160 samples of speech. The
/// model-parameter type is opaque to the rest of the crate: sessions hold
/// and forward parameter sets but never inspect or mutate them.
pub trait Vocoder {
    type ModelParams;

    /// Produce the initial parameter sets for a fresh session.
    ///
    /// This is the only fallible step of session creation; a failure here
    /// is fatal for the creation attempt and leaves no partial session.
    fn init_parameters(&mut self) -> Result<ParamSet<Self::ModelParams>, DvError>;

    /// Decode one frame, writing 160 samples into `audio_out` and advancing
    /// `params`. `errs` and `errs2` are the session's cumulative bit-error
    /// counters and `err_desc` its error-description slot; the vocoder owns
    /// their semantics. `scratch` arrives zero-filled on every call.
    ///
    /// There is no error return: decode quality, not call failure, is the
    /// signal of transmission corruption.
    #[allow(clippy::too_many_arguments)]
    fn decode(
        &mut self,
        audio_out: &mut [i16; SAMPLES_PER_FRAME],
        errs: &mut u32,
        errs2: &mut u32,
        err_desc: &mut String,
        frame: &DeinterleavedFrame,
        scratch: &mut [u8; AMBE_DATA_BITS],
        params: &mut ParamSet<Self::ModelParams>,
        quality: i32,
    );
}

/// Advisory signal-quality report attached to every decoded frame.
///
/// The counters are cumulative over the session's lifetime and never reset
/// after creation. They never abort a decode; callers that care about
/// signal quality inspect them after each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Primary bit-error counter.
    pub errs: u32,
    /// Secondary bit-error counter.
    pub errs2: u32,
    /// Human-readable description of the most recent decode, as produced
    /// by the vocoder. Empty when nothing was flagged.
    pub description: String,
}

/// One decoded frame: an owned snapshot of the 160 output samples plus the
/// advisory error report. The samples are a copy, not a view into session
/// state; they will not change under later decodes.
#[derive(Debug, Clone)]
pub struct FrameAudio {
    pub samples: [i16; SAMPLES_PER_FRAME],
    pub errors: ErrorReport,
}

/// Decoder state for one logical voice channel.
///
/// Sessions are exclusively owned and not internally synchronized; callers
/// that share one across threads must serialize access themselves. Frames
/// must be supplied in transmission order — the parameter rotation inside
/// the vocoder assumes temporal continuity.
pub struct DecodeSession<V: Vocoder> {
    vocoder: V,
    params: ParamSet<V::ModelParams>,
    audio_out: [i16; SAMPLES_PER_FRAME],
    errs: u32,
    errs2: u32,
    err_desc: String,
    quality: i32,
    frames_decoded: u64,
}

impl<V: Vocoder> DecodeSession<V> {
    /// Create a session with default-initialized state.
    pub fn new(mut vocoder: V) -> Result<Self, DvError> {
        let params = vocoder.init_parameters()?;
        Ok(Self {
            vocoder,
            params,
            audio_out: [0; SAMPLES_PER_FRAME],
            errs: 0,
            errs2: 0,
            err_desc: String::new(),
            quality: DEFAULT_QUALITY,
            frames_decoded: 0,
        })
    }

    /// Store an unvoiced-speech quality setting, verbatim.
    ///
    /// No range validation or clamping is performed; the vocoder is the
    /// authority on how out-of-range values behave.
    pub fn set_quality(&mut self, quality: i32) {
        self.quality = quality;
    }

    /// The current quality setting.
    pub fn quality(&self) -> i32 {
        self.quality
    }

    /// Number of frames decoded since creation.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Decode one deinterleaved frame into 160 PCM samples.
    ///
    /// Always produces audio; a corrupted frame yields a best-effort block
    /// with the damage reflected in the returned [`ErrorReport`].
    pub fn decode_frame(&mut self, frame: &DeinterleavedFrame) -> FrameAudio {
        let mut scratch = [0u8; AMBE_DATA_BITS];
        let errs_before = (self.errs, self.errs2);

        self.vocoder.decode(
            &mut self.audio_out,
            &mut self.errs,
            &mut self.errs2,
            &mut self.err_desc,
            frame,
            &mut scratch,
            &mut self.params,
            self.quality,
        );
        self.frames_decoded += 1;

        if (self.errs, self.errs2) != errs_before {
            log::debug!(
                "frame {}: bit errors now {}/{} ({})",
                self.frames_decoded,
                self.errs,
                self.errs2,
                self.err_desc
            );
        }

        FrameAudio {
            samples: self.audio_out,
            errors: ErrorReport {
                errs: self.errs,
                errs2: self.errs2,
                description: self.err_desc.clone(),
            },
        }
    }

    /// Deinterleave a raw 9-byte frame and decode it in one step.
    pub fn decode_bytes(&mut self, frame: &[u8]) -> Result<FrameAudio, DvError> {
        let matrix = crate::deinterleave::deinterleave(frame)?;
        Ok(self.decode_frame(&matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deinterleave::{deinterleave, FRAME_BYTES, PLANE_COLS, PLANE_ROWS};

    /// Deterministic stand-in for the native vocoder. Model parameters are
    /// a generation counter the decode rotates forward, so identical frames
    /// produce different output on successive calls, as the real vocoder's
    /// parameter history does.
    struct StubVocoder;

    impl Vocoder for StubVocoder {
        type ModelParams = u64;

        fn init_parameters(&mut self) -> Result<ParamSet<u64>, DvError> {
            Ok(ParamSet {
                current: 0,
                previous: 0,
                previous_enhanced: 0,
            })
        }

        fn decode(
            &mut self,
            audio_out: &mut [i16; SAMPLES_PER_FRAME],
            errs: &mut u32,
            errs2: &mut u32,
            err_desc: &mut String,
            frame: &DeinterleavedFrame,
            scratch: &mut [u8; AMBE_DATA_BITS],
            params: &mut ParamSet<u64>,
            quality: i32,
        ) {
            assert!(scratch.iter().all(|&b| b == 0), "scratch must be zeroed");

            let mut ones = 0u32;
            for row in 0..PLANE_ROWS {
                for col in 0..PLANE_COLS {
                    ones += u32::from(frame.bit(row, col));
                }
            }

            params.previous_enhanced = params.previous;
            params.previous = params.current;
            params.current += 1;

            for (i, sample) in audio_out.iter_mut().enumerate() {
                let mix = params.current
                    .wrapping_mul(31)
                    .wrapping_add(u64::from(ones) * 7)
                    .wrapping_add(i as u64)
                    .wrapping_mul(quality.unsigned_abs() as u64 + 1);
                *sample = (mix % 65536) as i16;
            }

            *errs += ones;
            *errs2 += ones / 2;
            err_desc.clear();
            if ones > 0 {
                err_desc.push('=');
            }
        }
    }

    fn fresh_session() -> DecodeSession<StubVocoder> {
        DecodeSession::new(StubVocoder).unwrap()
    }

    #[test]
    fn fresh_session_has_default_quality() {
        assert_eq!(fresh_session().quality(), DEFAULT_QUALITY);
    }

    #[test]
    fn quality_is_stored_verbatim() {
        let mut session = fresh_session();
        session.set_quality(7);
        assert_eq!(session.quality(), 7);
        // Out-of-range values pass through untouched; interpretation is the
        // vocoder's business.
        session.set_quality(-5);
        assert_eq!(session.quality(), -5);
        session.set_quality(1000);
        assert_eq!(session.quality(), 1000);
    }

    #[test]
    fn decode_returns_160_samples_and_advances_frame_count() {
        let mut session = fresh_session();
        let matrix = deinterleave(&[0u8; FRAME_BYTES]).unwrap();
        let audio = session.decode_frame(&matrix);
        assert_eq!(audio.samples.len(), SAMPLES_PER_FRAME);
        assert_eq!(session.frames_decoded(), 1);
    }

    #[test]
    fn all_zero_frame_leaves_error_counters_at_zero() {
        let mut session = fresh_session();
        let audio = session.decode_bytes(&[0u8; FRAME_BYTES]).unwrap();
        assert_eq!(audio.errors.errs, 0);
        assert_eq!(audio.errors.errs2, 0);
        assert!(audio.errors.description.is_empty());
    }

    #[test]
    fn sessions_share_no_state() {
        let frames: [[u8; FRAME_BYTES]; 3] = [
            [0xAA; FRAME_BYTES],
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09],
            [0xFF; FRAME_BYTES],
        ];

        let mut a = fresh_session();
        let mut b = fresh_session();
        for frame in &frames {
            let out_a = a.decode_bytes(frame).unwrap();
            let out_b = b.decode_bytes(frame).unwrap();
            assert_eq!(out_a.samples, out_b.samples);
            assert_eq!(out_a.errors, out_b.errors);
        }
    }

    #[test]
    fn decode_is_not_idempotent_across_calls() {
        // Unlike deinterleave, decoding the same frame twice legitimately
        // differs: the parameter history has rotated in between.
        let mut session = fresh_session();
        let matrix = deinterleave(&[0x55; FRAME_BYTES]).unwrap();
        let first = session.decode_frame(&matrix);
        let second = session.decode_frame(&matrix);
        assert_ne!(first.samples, second.samples);
    }

    #[test]
    fn error_counters_are_cumulative() {
        let mut session = fresh_session();
        let first = session.decode_bytes(&[0xFF; FRAME_BYTES]).unwrap();
        let second = session.decode_bytes(&[0xFF; FRAME_BYTES]).unwrap();
        assert!(second.errors.errs > first.errors.errs);
        assert!(first.errors.errs > 0);
    }

    #[test]
    fn returned_samples_are_a_snapshot() {
        let mut session = fresh_session();
        let matrix = deinterleave(&[0x0F; FRAME_BYTES]).unwrap();
        let first = session.decode_frame(&matrix);
        let held = first.samples;
        session.decode_frame(&matrix);
        assert_eq!(first.samples, held);
    }
}
