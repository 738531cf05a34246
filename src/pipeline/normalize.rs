use crate::buffer::{PixelFormat, ScalarImageBuffer};
use crate::error::Result;

/// Fixed divisor mapping the depth models' output range to display range
pub const NORMALIZATION_DIVISOR: f32 = 255.0;

/// Divide every sample of a Float32 buffer by [`NORMALIZATION_DIVISOR`]
///
/// The divisor is constant; no min/max scan of the buffer takes place.
pub fn normalize(buffer: &ScalarImageBuffer) -> Result<ScalarImageBuffer> {
    let _span = tracing::debug_span!("normalize").entered();
    buffer.expect_format(PixelFormat::Float32)?;

    let (width, height) = buffer.dimensions();
    let mut output = ScalarImageBuffer::new(width, height, PixelFormat::Float32)?;
    let mut row = Vec::with_capacity(width as usize);

    for y in 0..height {
        row.clear();
        row.extend(buffer.f32_row(y)?.map(|v| v / NORMALIZATION_DIVISOR));
        output.set_f32_row(y, &row)?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn divides_by_255() {
        let buf = ScalarImageBuffer::from_f32(3, 1, &[255.0, 127.5, -510.0]).unwrap();
        let out = normalize(&buf).unwrap();
        assert_eq!(out.to_f32_vec().unwrap(), vec![1.0, 0.5, -2.0]);
    }

    #[test]
    fn zeros_stay_zero() {
        let buf = ScalarImageBuffer::new(4, 3, PixelFormat::Float32).unwrap();
        let out = normalize(&buf).unwrap();
        assert!(out.to_f32_vec().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn applies_once_per_call() {
        let buf = ScalarImageBuffer::from_f32(1, 1, &[65025.0]).unwrap();
        let once = normalize(&buf).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once.get_f32(0, 0).unwrap(), 255.0);
        assert_eq!(twice.get_f32(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn half_input_is_rejected() {
        let buf = ScalarImageBuffer::from_half_bits(1, 1, &[0x3C00]).unwrap();
        assert!(matches!(normalize(&buf), Err(Error::FormatMismatch { .. })));
    }
}
