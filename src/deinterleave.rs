//! D-STAR AMBE frame deinterleaving.
//!
//! Each received voice frame carries 72 bits that were interleaved across
//! the four AMBE code words before transmission. The decoder expects those
//! bits laid out as a 4×24 bit-plane matrix, so the first step of every
//! frame decode is undoing the interleave with the two fixed permutation
//! tables below.

use crate::error::DvError;

/// Size of one received AMBE voice frame in bytes.
pub const FRAME_BYTES: usize = 9;

/// Number of transmitted bits per voice frame.
pub const FRAME_BITS: usize = 72;

/// Rows (bit planes) in the deinterleaved matrix.
pub const PLANE_ROWS: usize = 4;

/// Columns per bit plane.
pub const PLANE_COLS: usize = 24;

// Row and column interleave tables from the D-STAR AMBE framing. Transmission
// bit i lands at matrix[W[i]][X[i]]. Protocol constants, copied verbatim;
// they are not derivable from anything else in this crate.
#[rustfmt::skip]
const W: [usize; FRAME_BITS] = [
    0, 0, 3, 2, 1, 1, 0, 0, 1, 1, 0, 0,
    3, 2, 1, 1, 3, 2, 1, 1, 0, 0, 3, 2,
    0, 0, 3, 2, 1, 1, 0, 0, 1, 1, 0, 0,
    3, 2, 1, 1, 3, 2, 1, 1, 0, 0, 3, 2,
    0, 0, 3, 2, 1, 1, 0, 0, 1, 1, 0, 0,
    3, 2, 1, 1, 3, 3, 2, 1, 0, 0, 3, 3,
];

#[rustfmt::skip]
const X: [usize; FRAME_BITS] = [
    10, 22, 11,  9, 10, 22, 11, 23,  8, 20,  9, 21,
    10,  8,  9, 21,  8,  6,  7, 19,  8, 20,  9,  7,
     6, 18,  7,  5,  6, 18,  7, 19,  4, 16,  5, 17,
     6,  4,  5, 17,  4,  2,  3, 15,  4, 16,  5,  3,
     2, 14,  3,  1,  2, 14,  3, 15,  0, 12,  1, 13,
     2,  0,  1, 13,  0, 12, 10, 11,  0, 12,  1, 13,
];

/// A voice frame reordered into the 4×24 bit-plane layout the vocoder
/// decode routine consumes.
///
/// Exactly 72 of the 96 cells hold a received bit; the remaining 24 are
/// always zero. That sparse padding is part of the decode contract, not an
/// artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeinterleavedFrame {
    bits: [[u8; PLANE_COLS]; PLANE_ROWS],
}

impl DeinterleavedFrame {
    /// The full bit-plane matrix, one byte per bit cell.
    pub fn planes(&self) -> &[[u8; PLANE_COLS]; PLANE_ROWS] {
        &self.bits
    }

    /// A single cell of the matrix.
    pub fn bit(&self, row: usize, col: usize) -> u8 {
        self.bits[row][col]
    }
}

/// Reorder one received 9-byte voice frame into bit-plane layout.
///
/// Bits are consumed least-significant-bit first within each byte, in
/// transmission order. Any input length other than 9 bytes fails with
/// [`DvError::InvalidFrameSize`] before a single bit is touched.
pub fn deinterleave(frame: &[u8]) -> Result<DeinterleavedFrame, DvError> {
    if frame.len() != FRAME_BYTES {
        return Err(DvError::InvalidFrameSize(frame.len()));
    }

    let mut bits = [[0u8; PLANE_COLS]; PLANE_ROWS];
    for i in 0..FRAME_BITS {
        let bit = (frame[i / 8] >> (i % 8)) & 1;
        bits[W[i]][X[i]] = bit;
    }

    Ok(DeinterleavedFrame { bits })
}
