use crate::buffer::{decode_half, PixelFormat, ScalarImageBuffer};
use crate::error::Result;

/// Convert a model output buffer to a tightly packed Float32 buffer
///
/// `expected` is the format the caller declared for this model output; a
/// buffer in any other format is rejected with `FormatMismatch` and no
/// output is produced. Half16 samples are decoded with [`decode_half`],
/// Float32 samples are copied. Input row padding is not carried over.
pub fn convert_to_f32(buffer: &ScalarImageBuffer, expected: PixelFormat) -> Result<ScalarImageBuffer> {
    let _span = tracing::debug_span!("convert", format = %expected).entered();
    buffer.expect_format(expected)?;

    let (width, height) = buffer.dimensions();
    let mut output = ScalarImageBuffer::new(width, height, PixelFormat::Float32)?;
    let mut row = Vec::with_capacity(width as usize);

    for y in 0..height {
        row.clear();
        match buffer.format() {
            PixelFormat::Half16 => row.extend(buffer.half_row(y)?.map(decode_half)),
            PixelFormat::Float32 => row.extend(buffer.f32_row(y)?),
        }
        output.set_f32_row(y, &row)?;
    }

    Ok(output)
}

/// Decode a Half16 model output into Float32
pub fn cast_half_to_f32(buffer: &ScalarImageBuffer) -> Result<ScalarImageBuffer> {
    convert_to_f32(buffer, PixelFormat::Half16)
}
