//! Discrete depth-in-meters heatmap
//!
//! Depth is quantized into 0.1 m bands between 0.0 and 3.5 m, each band with a
//! fixed color. There is no blending between bands: visible banding marks
//! 10 cm steps.

use crate::error::{Error, Result};
use image::{Rgb, RgbImage};
use ndarray::{Array4, ArrayView2};

/// Width of one color band in meters
pub const BIN_WIDTH_METERS: f32 = 0.1;

/// Number of color bands
pub const BIN_COUNT: usize = 35;

/// Band colors, nearest first: white, yellow, orange, red, purple, blue,
/// green, black.
pub const DEPTH_COLORS: [[u8; 3]; BIN_COUNT] = [
    [255, 255, 255],
    [255, 255, 204],
    [255, 255, 153],
    [255, 255, 102],
    [255, 255, 0],
    [255, 230, 0],
    [255, 204, 0],
    [255, 178, 0],
    [255, 153, 0],
    [255, 128, 0],
    [255, 96, 0],
    [255, 64, 0],
    [255, 0, 0],
    [204, 0, 64],
    [166, 0, 102],
    [128, 0, 128],
    [102, 0, 153],
    [76, 0, 178],
    [51, 0, 204],
    [0, 0, 255],
    [0, 64, 255],
    [0, 128, 255],
    [0, 178, 204],
    [0, 204, 153],
    [0, 204, 102],
    [0, 204, 0],
    [0, 170, 0],
    [0, 140, 0],
    [0, 110, 0],
    [0, 85, 0],
    [0, 64, 0],
    [0, 48, 0],
    [0, 32, 0],
    [16, 16, 16],
    [0, 0, 0],
];

/// Band index for a depth value, clamped into `[0, BIN_COUNT - 1]`
///
/// NaN falls into band 0.
#[inline]
pub fn depth_bin(meters: f32) -> usize {
    // Float-to-int `as` saturates and maps NaN to 0.
    let bin = (meters * 10.0).floor() as i64;
    bin.clamp(0, BIN_COUNT as i64 - 1) as usize
}

/// Color for a depth value in meters
#[inline]
pub fn depth_color(meters: f32) -> Rgb<u8> {
    Rgb(DEPTH_COLORS[depth_bin(meters)])
}

/// Map a `[height, width]` grid of depths in meters to an RGB heatmap
pub fn depth_to_color_image(depth_meters: ArrayView2<'_, f32>) -> Result<RgbImage> {
    let (rows, cols) = depth_meters.dim();
    let width = u32::try_from(cols).unwrap_or(u32::MAX);
    let height = u32::try_from(rows).unwrap_or(u32::MAX);
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }

    let _span = tracing::debug_span!("colormap", width, height).entered();
    Ok(RgbImage::from_fn(width, height, |x, y| {
        depth_color(depth_meters[[y as usize, x as usize]])
    }))
}

/// Map a `[1, 1, height, width]` model output to an RGB heatmap
pub fn depth_tensor_to_color_image(depth_meters: &Array4<f32>) -> Result<RgbImage> {
    let shape = depth_meters.shape();
    if shape[0] != 1 || shape[1] != 1 {
        return Err(Error::InvalidShape(shape.to_vec()));
    }
    let plane = depth_meters.slice(ndarray::s![0, 0, .., ..]);
    depth_to_color_image(plane)
}
