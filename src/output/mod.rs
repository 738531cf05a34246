mod png;

pub use png::PngOutput;

use anyhow::Result;
use image::DynamicImage;

/// Trait for output destinations
pub trait OutputSink {
    /// Write a finished image
    fn write_image(&mut self, image: &DynamicImage) -> Result<()>;
}
