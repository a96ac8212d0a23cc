//! Errors raised by frame processing.

/// Errors that can occur while processing a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExclusionError {
    /// A frame arrived before width and height were negotiated.
    #[error("filter is not configured: width and height have not been negotiated")]
    Unconfigured,

    /// `width * height` does not describe the supplied pixel buffer.
    #[error("invalid dimensions: {width}x{height} does not match a buffer of {pixels} pixels")]
    InvalidDimensions {
        width: u32,
        height: u32,
        pixels: usize,
    },

    /// Frame dimensions must both be positive.
    #[error("frame dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// A byte buffer that is not a whole number of 32-bit pixels.
    #[error("buffer length {len} is not a whole number of 32-bit pixels")]
    BufferLength { len: usize },

    /// Input and output pixel buffers differ in length.
    #[error("output holds {output} pixels but input has {input}")]
    LengthMismatch { input: usize, output: usize },
}
