use crate::error::{Error, Result};
use image::{Rgb, RgbImage, RgbaImage};

/// Opacity applied to class masks when drawn over the photo
pub const DEFAULT_MASK_OPACITY: f32 = 0.5;

/// Composite a class mask over the photo it was computed from
///
/// The mask's own alpha is scaled by `opacity` and blended source-over onto
/// `base`. Both images must have the same dimensions.
pub fn overlay(mask: &RgbaImage, base: &RgbImage, opacity: f32) -> Result<RgbImage> {
    if mask.dimensions() != base.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: base.dimensions(),
            actual: mask.dimensions(),
        });
    }

    let _span = tracing::debug_span!("overlay", opacity).entered();
    let opacity = opacity.clamp(0.0, 1.0);
    let (width, height) = base.dimensions();

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let src = mask.get_pixel(x, y);
        let dst = base.get_pixel(x, y);
        let alpha = src[3] as f32 / 255.0 * opacity;
        let blend = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
        Rgb([
            blend(src[0], dst[0]),
            blend(src[1], dst[1]),
            blend(src[2], dst[2]),
        ])
    }))
}
