//! Errors raised at the boundaries of the pixel operations.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("buffer holds {actual} values, expected {expected} ({width}x{height}x{channels})")]
    BufferLength {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },
    #[error("image shapes differ: original {original:?}, processed {processed:?}")]
    ShapeMismatch {
        original: (u32, u32, usize),
        processed: (u32, u32, usize),
    },
    #[error("mask dimensions {mask:?} incompatible with image {image:?}")]
    IncompatibleMask { mask: (u32, u32), image: (u32, u32) },
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}
