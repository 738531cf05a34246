use super::OutputSink;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};

/// Writes images as PNG to a fixed path
pub struct PngOutput {
    path: PathBuf,
}

impl PngOutput {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for PngOutput {
    fn write_image(&mut self, image: &DynamicImage) -> Result<()> {
        tracing::info!(
            "Writing {}x{} PNG to {}",
            image.width(),
            image.height(),
            self.path.display()
        );

        // PNG holds 8-bit RGB(A) or gray; anything wider is narrowed first.
        let image = match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
                image.clone()
            }
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        };

        image
            .save_with_format(&self.path, ImageFormat::Png)
            .with_context(|| format!("Failed to write PNG to {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn writes_readable_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut sink = PngOutput::new(&path);

        let img = RgbImage::from_pixel(3, 2, Rgb([128, 0, 128]));
        sink.write_image(&DynamicImage::ImageRgb8(img.clone())).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back, img);
    }

    #[test]
    fn float_images_are_narrowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.png");
        let img = DynamicImage::ImageRgb32F(image::Rgb32FImage::from_pixel(1, 1, Rgb([1.0, 0.0, 0.0])));
        PngOutput::new(&path).write_image(&img).unwrap();

        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn unwritable_path_fails() {
        let mut sink = PngOutput::new("/nonexistent-dir/out.png");
        assert!(sink.write_image(&DynamicImage::new_rgb8(1, 1)).is_err());
    }
}
