mod labels;
mod overlay;
mod palette;

pub use labels::{class_histogram, ClassLabels, EMPTY_LABEL};
pub use overlay::{overlay, DEFAULT_MASK_OPACITY};
pub use palette::SemanticPalette;
