use super::CaptureSource;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Still photo read from disk (PNG, JPEG)
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CaptureSource for ImageFile {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        let image = image::open(&self.path)
            .with_context(|| format!("Failed to load image {}", self.path.display()))?
            .to_rgb8();

        let (width, height) = image.dimensions();
        tracing::info!("Original image size {}x{}", width, height);
        Ok(image)
    }
}
