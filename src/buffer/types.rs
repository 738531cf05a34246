use crate::error::{try_zeroed, Error, Result};
use std::fmt;

/// Element format of a single-channel model output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// IEEE-754 binary16, decoded with [`decode_half`](super::decode_half)
    Half16,
    /// IEEE-754 binary32
    Float32,
}

impl PixelFormat {
    /// Size of one sample in bytes
    pub const fn element_size(self) -> usize {
        match self {
            PixelFormat::Half16 => 2,
            PixelFormat::Float32 => 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Half16 => f.write_str("Half16"),
            PixelFormat::Float32 => f.write_str("Float32"),
        }
    }
}

/// Single-channel image buffer as returned by a model
///
/// Samples are stored row-major and little-endian. Rows may be padded:
/// `bytes_per_row` is at least `width * element_size` and all access goes
/// through it, never through `width` alone.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarImageBuffer {
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl ScalarImageBuffer {
    /// Allocate a zeroed, tightly packed buffer
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        check_dimensions(width, height)?;
        let bytes_per_row = packed_row_len(width, format)?;
        let len = bytes_per_row
            .checked_mul(height as usize)
            .ok_or(Error::AllocationFailure { bytes: usize::MAX })?;
        let data = try_zeroed(len)?;
        Ok(Self {
            width,
            height,
            bytes_per_row,
            format,
            data,
        })
    }

    /// Wrap existing storage with an explicit row pitch
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        bytes_per_row: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        let row_len = packed_row_len(width, format)?;
        if bytes_per_row < row_len {
            return Err(Error::BufferTooSmall {
                expected: row_len,
                actual: bytes_per_row,
            });
        }
        // The final row does not need trailing padding.
        let required = bytes_per_row
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(row_len))
            .ok_or(Error::AllocationFailure { bytes: usize::MAX })?;
        if data.len() < required {
            return Err(Error::BufferTooSmall {
                expected: required,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bytes_per_row,
            format,
            data,
        })
    }

    /// Tightly packed Float32 buffer from exactly `width * height` row-major samples
    pub fn from_f32(width: u32, height: u32, samples: &[f32]) -> Result<Self> {
        check_sample_count(width, height, samples.len())?;
        let data: Vec<u8> = samples.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::from_raw(width, height, PixelFormat::Float32, width as usize * 4, data)
    }

    /// Tightly packed Half16 buffer from exactly `width * height` row-major bit patterns
    pub fn from_half_bits(width: u32, height: u32, samples: &[u16]) -> Result<Self> {
        check_sample_count(width, height, samples.len())?;
        let data: Vec<u8> = samples.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::from_raw(width, height, PixelFormat::Half16, width as usize * 2, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn is_tightly_packed(&self) -> bool {
        self.bytes_per_row == self.width as usize * self.format.element_size()
    }

    /// Bytes of row `y`, excluding padding
    pub fn row_bytes(&self, y: u32) -> Result<&[u8]> {
        self.check_bounds(0, y)?;
        let start = y as usize * self.bytes_per_row;
        let len = self.width as usize * self.format.element_size();
        Ok(&self.data[start..start + len])
    }

    fn row_bytes_mut(&mut self, y: u32) -> Result<&mut [u8]> {
        self.check_bounds(0, y)?;
        let start = y as usize * self.bytes_per_row;
        let len = self.width as usize * self.format.element_size();
        Ok(&mut self.data[start..start + len])
    }

    /// Raw Half16 bit patterns of row `y`
    pub fn half_row(&self, y: u32) -> Result<impl Iterator<Item = u16> + '_> {
        self.expect_format(PixelFormat::Half16)?;
        Ok(self
            .row_bytes(y)?
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]])))
    }

    /// Float32 samples of row `y`
    pub fn f32_row(&self, y: u32) -> Result<impl Iterator<Item = f32> + '_> {
        self.expect_format(PixelFormat::Float32)?;
        Ok(self
            .row_bytes(y)?
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])))
    }

    /// Overwrite row `y` of a Float32 buffer with exactly `width` samples
    pub fn set_f32_row(&mut self, y: u32, samples: &[f32]) -> Result<()> {
        self.expect_format(PixelFormat::Float32)?;
        if samples.len() != self.width as usize {
            return Err(Error::SampleCount {
                expected: self.width as usize,
                actual: samples.len(),
            });
        }
        let row = self.row_bytes_mut(y)?;
        for (dst, v) in row.chunks_exact_mut(4).zip(samples) {
            dst.copy_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    /// Float32 sample at (x, y)
    pub fn get_f32(&self, x: u32, y: u32) -> Result<f32> {
        self.expect_format(PixelFormat::Float32)?;
        self.check_bounds(x, y)?;
        let i = x as usize * 4;
        let b = &self.row_bytes(y)?[i..i + 4];
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// All Float32 samples in row-major order, padding dropped
    pub fn to_f32_vec(&self) -> Result<Vec<f32>> {
        self.expect_format(PixelFormat::Float32)?;
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            out.extend(self.f32_row(y)?);
        }
        Ok(out)
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x < self.width && y < self.height {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub(crate) fn expect_format(&self, expected: PixelFormat) -> Result<()> {
        if self.format == expected {
            Ok(())
        } else {
            Err(Error::FormatMismatch {
                expected,
                found: self.format,
            })
        }
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

fn packed_row_len(width: u32, format: PixelFormat) -> Result<usize> {
    (width as usize)
        .checked_mul(format.element_size())
        .ok_or(Error::AllocationFailure { bytes: usize::MAX })
}

fn check_sample_count(width: u32, height: u32, actual: usize) -> Result<()> {
    check_dimensions(width, height)?;
    let expected = width as usize * height as usize;
    if actual != expected {
        return Err(Error::SampleCount { expected, actual });
    }
    Ok(())
}
