//! Post-processing for on-device depth, segmentation and classification
//! models.
//!
//! The model runtime is a black box behind [`inference::InferenceBackend`].
//! This crate turns its raw outputs into images ready for display or PNG
//! export: half-float decoding, Float32 conversion, fixed-divisor
//! normalization, resizing back to the photo resolution and the 0.1 m depth
//! heatmap.

pub mod buffer;
pub mod capture;
pub mod classification;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod segmentation;

pub use buffer::{decode_half, PixelFormat, ScalarImageBuffer};
pub use error::{Error, Result};
pub use pipeline::ProcessingContext;
