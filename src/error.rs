/// Errors reported by the decoding pipeline.
///
/// Signal-quality degradation is deliberately *not* an error: a corrupted
/// voice frame still produces a best-effort audio block, and the damage is
/// reported through the advisory [`ErrorReport`](crate::session::ErrorReport)
/// counters instead.
#[derive(thiserror::Error, Debug)]
pub enum DvError {
    #[error("AMBE voice frame must be exactly 9 bytes, got {0}")]
    InvalidFrameSize(usize),
    #[error("vocoder initialization failed: {0}")]
    VocoderInit(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a DVTool file: bad magic bytes")]
    BadMagic,
    #[error("malformed DVTool stream: {0}")]
    MalformedStream(String),
}
