use crate::buffer::PixelFormat;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the post-processing pipeline
///
/// Every variant is fatal for the frame being processed. Nothing in the
/// library retries or substitutes default data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported pixel format: expected {expected}, found {found}")]
    FormatMismatch {
        expected: PixelFormat,
        found: PixelFormat,
    },

    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to allocate {bytes} bytes for output buffer")]
    AllocationFailure { bytes: usize },

    #[error("buffer too small: layout needs {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("expected {expected} samples, got {actual}")]
    SampleCount { expected: usize, actual: usize },

    #[error("({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("invalid tensor shape {0:?}, expected [1, 1, H, W]")]
    InvalidShape(Vec<usize>),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid label metadata: {0}")]
    Labels(#[from] serde_json::Error),
}

/// Reserve a zeroed vector of `len` elements, reporting allocation failure
/// instead of aborting.
pub(crate) fn try_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    data.resize(len, T::default());
    Ok(data)
}
