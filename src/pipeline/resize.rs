use crate::buffer::{check_dimensions, PixelFormat, ScalarImageBuffer};
use crate::error::Result;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel};

/// Bilinear resize of a Float32 buffer to `target_width × target_height`
///
/// The axes scale independently by `target / source`, so a change of aspect
/// ratio stretches the image. Destination pixel centers are mapped back onto
/// source pixel centers, which keeps the output origin at (0, 0) with no
/// half-pixel drift. Resizing to the current size returns an exact copy.
pub fn resize_scalar(
    buffer: &ScalarImageBuffer,
    target_width: u32,
    target_height: u32,
) -> Result<ScalarImageBuffer> {
    check_dimensions(target_width, target_height)?;
    buffer.expect_format(PixelFormat::Float32)?;

    let (src_w, src_h) = buffer.dimensions();
    let _span = tracing::debug_span!(
        "resize",
        from = ?(src_w, src_h),
        to = ?(target_width, target_height)
    )
    .entered();

    let src = buffer.to_f32_vec()?;
    let mut output = ScalarImageBuffer::new(target_width, target_height, PixelFormat::Float32)?;

    if (src_w, src_h) == (target_width, target_height) {
        for y in 0..src_h {
            let start = y as usize * src_w as usize;
            output.set_f32_row(y, &src[start..start + src_w as usize])?;
        }
        return Ok(output);
    }

    let scale_x = target_width as f32 / src_w as f32;
    let scale_y = target_height as f32 / src_h as f32;
    let columns: Vec<Tap> = (0..target_width).map(|x| Tap::new(x, scale_x, src_w)).collect();
    let stride = src_w as usize;
    let mut row = vec![0.0f32; target_width as usize];

    for y in 0..target_height {
        let ty = Tap::new(y, scale_y, src_h);
        let upper = &src[ty.i0 * stride..(ty.i0 + 1) * stride];
        let lower = &src[ty.i1 * stride..(ty.i1 + 1) * stride];
        for (dst, tx) in row.iter_mut().zip(&columns) {
            let top = lerp(upper[tx.i0], upper[tx.i1], tx.t);
            let bottom = lerp(lower[tx.i0], lower[tx.i1], tx.t);
            *dst = lerp(top, bottom, ty.t);
        }
        output.set_f32_row(y, &row)?;
    }

    Ok(output)
}

/// Resize an 8-bit color or gray image with one of the `image` filters
///
/// `FilterType::Triangle` is bilinear; `Nearest` keeps palette colors intact.
pub fn resize_color<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    check_dimensions(target_width, target_height)?;

    if image.dimensions() == (target_width, target_height) {
        return Ok(image.clone());
    }

    let _span = tracing::debug_span!(
        "resize_color",
        from = ?image.dimensions(),
        to = ?(target_width, target_height)
    )
    .entered();
    Ok(imageops::resize(image, target_width, target_height, filter))
}

/// Two source taps and the blend weight for one destination coordinate
struct Tap {
    i0: usize,
    i1: usize,
    t: f32,
}

impl Tap {
    fn new(dst: u32, scale: f32, src_len: u32) -> Self {
        let last = (src_len - 1) as f32;
        let pos = ((dst as f32 + 0.5) / scale - 0.5).clamp(0.0, last);
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(src_len as usize - 1);
        Self {
            i0,
            i1,
            t: pos - i0 as f32,
        }
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::{Rgb, RgbImage};

    fn gradient(w: u32, h: u32) -> ScalarImageBuffer {
        let samples: Vec<f32> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x + y) as f32))
            .collect();
        ScalarImageBuffer::from_f32(w, h, &samples).unwrap()
    }

    #[test]
    fn same_size_is_identity() {
        let buf = gradient(7, 5);
        let out = resize_scalar(&buf, 7, 5).unwrap();
        assert_eq!(out.to_f32_vec().unwrap(), buf.to_f32_vec().unwrap());
    }

    #[test]
    fn upscale_interpolates_between_centers() {
        let buf = ScalarImageBuffer::from_f32(2, 1, &[0.0, 1.0]).unwrap();
        let out = resize_scalar(&buf, 4, 1).unwrap();
        assert_eq!(out.to_f32_vec().unwrap(), vec![0.0, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn downscale_keeps_origin() {
        let buf = ScalarImageBuffer::from_f32(4, 1, &[0.0, 1.0, 2.0, 3.0]).unwrap();
        let out = resize_scalar(&buf, 2, 1).unwrap();
        assert_eq!(out.to_f32_vec().unwrap(), vec![0.5, 2.5]);
    }

    #[test]
    fn non_uniform_scale_stretches() {
        let buf = ScalarImageBuffer::from_f32(2, 2, &[1.0; 4]).unwrap();
        let out = resize_scalar(&buf, 8, 3).unwrap();
        assert_eq!(out.dimensions(), (8, 3));
        assert!(out.to_f32_vec().unwrap().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn round_trip_keeps_dimensions_and_mean() {
        let buf = gradient(16, 12);
        let small = resize_scalar(&buf, 5, 9).unwrap();
        let back = resize_scalar(&small, 16, 12).unwrap();
        assert_eq!(back.dimensions(), (16, 12));

        let mean = |b: &ScalarImageBuffer| {
            let v = b.to_f32_vec().unwrap();
            v.iter().sum::<f32>() / v.len() as f32
        };
        assert!((mean(&back) - mean(&buf)).abs() < 1.0);
    }

    #[test]
    fn zero_target_is_rejected() {
        let buf = gradient(2, 2);
        assert!(matches!(
            resize_scalar(&buf, 0, 2),
            Err(Error::InvalidDimensions { width: 0, height: 2 })
        ));
        let img = RgbImage::new(2, 2);
        assert!(matches!(
            resize_color(&img, 3, 0, FilterType::Triangle),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn color_resize_stretches_to_target() {
        let img = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let out = resize_color(&img, 3, 9, FilterType::Triangle).unwrap();
        assert_eq!(out.dimensions(), (3, 9));
        for p in out.pixels() {
            for (got, want) in p.0.iter().zip([10u8, 20, 30]) {
                assert!(got.abs_diff(want) <= 1, "{:?}", p);
            }
        }
    }
}
