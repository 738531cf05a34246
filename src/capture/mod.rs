mod file;

pub use file::ImageFile;

use anyhow::Result;
use image::RgbImage;

/// Trait for photo sources
pub trait CaptureSource {
    /// Capture a single frame
    fn capture_frame(&mut self) -> Result<RgbImage>;
}
