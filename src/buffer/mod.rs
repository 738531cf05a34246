mod half;
mod types;

pub use half::decode_half;
pub use types::{PixelFormat, ScalarImageBuffer};

pub(crate) use types::check_dimensions;
