//! Vocoder backends.
//!
//! This module contains implementations of the [`Vocoder`](crate::Vocoder)
//! trait backed by native codec libraries.
//!
//! # Available Backends
//!
//! Enable backends via Cargo features:
//! - `mbelib` - AMBE decoding via the system mbelib library

#[cfg(feature = "mbelib")]
pub mod mbe;
