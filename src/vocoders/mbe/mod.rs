//! AMBE vocoder backend built on mbelib.
//!
//! mbelib is an open-source reimplementation of the AMBE/IMBE voice codecs;
//! this backend drives its D-STAR entry point
//! (`mbe_processAmbe3600x2400Frame`) through the [`Vocoder`](crate::Vocoder)
//! trait.
//!
//! # System Requirements
//!
//! **mbelib** must be installed on your system:
//! - **Linux**: build and install from <https://github.com/szechyjs/mbelib>
//! - **macOS**: `brew install mbelib`
//!
//! The crate links against `libmbe` at build time when the `mbelib` feature
//! is enabled.
//!
//! # Examples
//!
//! ```ignore
//! use dv_rs::{DecodeSession, vocoders::mbe::MbeVocoder};
//!
//! let mut session = DecodeSession::new(MbeVocoder::new())?;
//! let audio = session.decode_bytes(&frame_bytes)?;
//! println!("decoded {} samples, {} bit errors", audio.samples.len(), audio.errors.errs);
//! # Ok::<(), dv_rs::DvError>(())
//! ```

mod ffi;
mod vocoder;

pub use vocoder::{MbeParams, MbeVocoder};
