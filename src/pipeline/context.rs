use super::colormap::depth_tensor_to_color_image;
use super::convert::convert_to_f32;
use super::normalize::normalize;
use super::resize::{resize_color, resize_scalar};
use crate::buffer::{check_dimensions, PixelFormat, ScalarImageBuffer};
use crate::error::Result;
use crate::segmentation::SemanticPalette;
use image::imageops::FilterType;
use image::{GrayImage, Luma, RgbImage, RgbaImage};
use ndarray::{Array2, Array4};

/// Per-caller state for one model's pre- and post-processing
///
/// Owned by whoever drives the model; nothing here is shared between
/// threads or reused between frames.
#[derive(Clone, Debug)]
pub struct ProcessingContext {
    target_width: u32,
    target_height: u32,
    output_format: PixelFormat,
    filter: FilterType,
}

impl ProcessingContext {
    /// Context for a model taking `target_width × target_height` input and
    /// returning single-channel buffers in `output_format`.
    pub fn new(target_width: u32, target_height: u32, output_format: PixelFormat) -> Result<Self> {
        check_dimensions(target_width, target_height)?;
        Ok(Self {
            target_width,
            target_height,
            output_format,
            filter: FilterType::Triangle,
        })
    }

    /// Filter used to resize the input photo (default: bilinear)
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn input_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    pub fn output_format(&self) -> PixelFormat {
        self.output_format
    }

    /// Stretch an input photo to the model's input resolution
    pub fn prepare_input(&self, image: &RgbImage) -> Result<RgbImage> {
        let _span = tracing::debug_span!("prepare_input").entered();
        resize_color(image, self.target_width, self.target_height, self.filter)
    }

    /// The resized photo as a `[1, 3, H, W]` tensor, channels scaled to [0, 1]
    ///
    /// For runtimes that take tensors rather than images.
    pub fn to_tensor(&self, image: &RgbImage) -> Result<Array4<f32>> {
        let resized = self.prepare_input(image)?;
        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }

        Ok(tensor)
    }

    /// Normalized inverse depth at the original photo resolution
    ///
    /// convert → divide by 255 → resize → 8-bit gray.
    pub fn normalized_inverse_depth(
        &self,
        buffer: &ScalarImageBuffer,
        original: (u32, u32),
    ) -> Result<GrayImage> {
        let _span = tracing::debug_span!("normalized_inverse_depth").entered();
        let converted = convert_to_f32(buffer, self.output_format)?;
        let normalized = normalize(&converted)?;
        let resized = resize_scalar(&normalized, original.0, original.1)?;
        scalar_to_gray(&resized)
    }

    /// Relative depth already in display range, at the original resolution
    ///
    /// Same as [`normalized_inverse_depth`](Self::normalized_inverse_depth)
    /// without the 255 divisor.
    pub fn relative_depth(&self, buffer: &ScalarImageBuffer, original: (u32, u32)) -> Result<GrayImage> {
        let _span = tracing::debug_span!("relative_depth").entered();
        let converted = convert_to_f32(buffer, self.output_format)?;
        let resized = resize_scalar(&converted, original.0, original.1)?;
        scalar_to_gray(&resized)
    }

    /// Depth-in-meters heatmap at the original resolution
    ///
    /// Resized nearest-neighbour so every pixel stays on a band color.
    pub fn metric_depth(&self, depth_meters: &Array4<f32>, original: (u32, u32)) -> Result<RgbImage> {
        let _span = tracing::debug_span!("metric_depth").entered();
        let heatmap = depth_tensor_to_color_image(depth_meters)?;
        resize_color(&heatmap, original.0, original.1, FilterType::Nearest)
    }

    /// Color-coded class mask at the original resolution
    ///
    /// Nearest-neighbour resize keeps every pixel on a palette color.
    pub fn semantic_mask(
        &self,
        class_map: &Array2<i32>,
        palette: &SemanticPalette,
        original: (u32, u32),
    ) -> Result<RgbaImage> {
        let _span = tracing::debug_span!("semantic_mask").entered();
        let mask = palette.map_to_image(class_map.view())?;
        resize_color(&mask, original.0, original.1, FilterType::Nearest)
    }
}

/// Render a Float32 buffer as 8-bit gray, clamping to [0, 1]
pub fn scalar_to_gray(buffer: &ScalarImageBuffer) -> Result<GrayImage> {
    let (width, height) = buffer.dimensions();
    let samples = buffer.to_f32_vec()?;
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let v = samples[(y * width + x) as usize];
        Luma([(v * 255.0).round().clamp(0.0, 255.0) as u8])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::Rgb;

    #[test]
    fn rejects_zero_input_size() {
        assert!(matches!(
            ProcessingContext::new(0, 10, PixelFormat::Half16),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn prepare_input_stretches_to_model_size() {
        let ctx = ProcessingContext::new(6, 4, PixelFormat::Half16).unwrap();
        let photo = RgbImage::from_pixel(30, 10, Rgb([1, 2, 3]));
        let input = ctx.prepare_input(&photo).unwrap();
        assert_eq!(input.dimensions(), (6, 4));
    }

    #[test]
    fn tensor_is_nchw_in_unit_range() {
        let ctx = ProcessingContext::new(2, 2, PixelFormat::Float32).unwrap();
        let mut photo = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        photo.put_pixel(1, 0, Rgb([255, 51, 0]));
        let tensor = ctx.to_tensor(&photo).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 0.2);
        assert_eq!(tensor[[0, 2, 0, 1]], 0.0);
        assert_eq!(tensor[[0, 0, 1, 1]], 0.0);
    }

    #[test]
    fn inverse_depth_is_scaled_and_restored() {
        let ctx = ProcessingContext::new(2, 2, PixelFormat::Half16).unwrap();
        // 255.0 in half precision is 0x5BF8.
        let raw = ScalarImageBuffer::from_half_bits(2, 2, &[0x5BF8; 4]).unwrap();
        let gray = ctx.normalized_inverse_depth(&raw, (5, 3)).unwrap();
        assert_eq!(gray.dimensions(), (5, 3));
        assert!(gray.pixels().all(|p| p.0 == [255]));
    }

    #[test]
    fn inverse_depth_rejects_undeclared_format() {
        let ctx = ProcessingContext::new(1, 1, PixelFormat::Half16).unwrap();
        let raw = ScalarImageBuffer::from_f32(1, 1, &[1.0]).unwrap();
        assert!(matches!(
            ctx.normalized_inverse_depth(&raw, (1, 1)),
            Err(Error::FormatMismatch { .. })
        ));
    }

    #[test]
    fn relative_depth_skips_divisor() {
        let ctx = ProcessingContext::new(1, 1, PixelFormat::Float32).unwrap();
        let raw = ScalarImageBuffer::from_f32(1, 1, &[0.5]).unwrap();
        let gray = ctx.relative_depth(&raw, (2, 2)).unwrap();
        assert!(gray.pixels().all(|p| p.0 == [128]));
    }

    #[test]
    fn metric_depth_restores_original_size() {
        let ctx = ProcessingContext::new(2, 2, PixelFormat::Float32).unwrap();
        let tensor = Array4::<f32>::from_elem((1, 1, 2, 2), 1.55);
        let img = ctx.metric_depth(&tensor, (7, 5)).unwrap();
        assert_eq!(img.dimensions(), (7, 5));
        assert!(img.pixels().all(|p| p.0 == [128, 0, 128]));
    }

    #[test]
    fn metric_depth_upscale_keeps_band_colors() {
        let ctx = ProcessingContext::new(2, 1, PixelFormat::Float32).unwrap();
        let mut tensor = Array4::<f32>::zeros((1, 1, 1, 2));
        tensor[[0, 0, 0, 1]] = 3.45;
        let img = ctx.metric_depth(&tensor, (16, 4)).unwrap();
        assert!(img
            .pixels()
            .all(|p| p.0 == [255, 255, 255] || p.0 == [0, 0, 0]));
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(15, 3).0, [0, 0, 0]);
    }

    #[test]
    fn gray_clamps_out_of_range() {
        let buf = ScalarImageBuffer::from_f32(3, 1, &[-0.5, 0.0, 2.0]).unwrap();
        let gray = scalar_to_gray(&buf).unwrap();
        assert_eq!(gray.as_raw(), &vec![0, 0, 255]);
    }
}
