//! Post-processing of raw model outputs into displayable images.

pub mod colormap;
mod context;
mod convert;
mod normalize;
mod resize;

pub use colormap::{depth_tensor_to_color_image, depth_to_color_image};
pub use context::{scalar_to_gray, ProcessingContext};
pub use convert::{cast_half_to_f32, convert_to_f32};
pub use normalize::{normalize, NORMALIZATION_DIVISOR};
pub use resize::{resize_color, resize_scalar};
