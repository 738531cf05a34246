use crate::buffer::ScalarImageBuffer;
use image::RgbImage;
use ndarray::{Array1, Array2, Array4};
use std::path::PathBuf;
use thiserror::Error;

/// Errors at the boundary with the model runtime
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("model did not return a '{expected}' feature (got '{found}')")]
    MissingFeature { expected: String, found: String },

    #[error("feature '{label}' is not {expected}")]
    UnexpectedOutput { label: String, expected: &'static str },

    #[error("input frame is {actual:?}, model expects {expected:?}")]
    InputSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("model output is {actual} bytes, layout needs {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("failed to read model output {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Pipeline(#[from] crate::Error),
}

/// Typed value of a model output feature
#[derive(Clone, Debug)]
pub enum OutputValue {
    /// Single-channel image (normalized inverse depth, relative depth)
    Image(ScalarImageBuffer),
    /// Absolute depth in meters, shape `[1, 1, H, W]`
    DepthMeters(Array4<f32>),
    /// Per-pixel class ids, shape `[H, W]`
    ClassMap(Array2<i32>),
    /// Class probabilities
    Probabilities(Array1<f32>),
}

impl OutputValue {
    fn kind(&self) -> &'static str {
        match self {
            OutputValue::Image(_) => "an image",
            OutputValue::DepthMeters(_) => "a depth tensor",
            OutputValue::ClassMap(_) => "a class map",
            OutputValue::Probabilities(_) => "a probability vector",
        }
    }
}

/// A named model output
#[derive(Clone, Debug)]
pub struct ModelOutput {
    pub label: String,
    pub value: OutputValue,
}

impl ModelOutput {
    /// Check that the model produced the feature the caller asked for
    pub fn expect_feature(&self, name: &str) -> Result<&Self, InferenceError> {
        if self.label == name {
            Ok(self)
        } else {
            Err(InferenceError::MissingFeature {
                expected: name.to_string(),
                found: self.label.clone(),
            })
        }
    }

    pub fn into_image(self) -> Result<ScalarImageBuffer, InferenceError> {
        match self.value {
            OutputValue::Image(buffer) => Ok(buffer),
            other => Err(unexpected(self.label, other.kind(), "an image")),
        }
    }

    pub fn into_depth_meters(self) -> Result<Array4<f32>, InferenceError> {
        match self.value {
            OutputValue::DepthMeters(tensor) => Ok(tensor),
            other => Err(unexpected(self.label, other.kind(), "a depth tensor")),
        }
    }

    pub fn into_class_map(self) -> Result<Array2<i32>, InferenceError> {
        match self.value {
            OutputValue::ClassMap(map) => Ok(map),
            other => Err(unexpected(self.label, other.kind(), "a class map")),
        }
    }

    pub fn into_probabilities(self) -> Result<Array1<f32>, InferenceError> {
        match self.value {
            OutputValue::Probabilities(probs) => Ok(probs),
            other => Err(unexpected(self.label, other.kind(), "a probability vector")),
        }
    }
}

fn unexpected(label: String, got: &'static str, expected: &'static str) -> InferenceError {
    tracing::debug!("feature '{}' holds {}", label, got);
    InferenceError::UnexpectedOutput { label, expected }
}

/// Trait for model runtimes
///
/// The runtime is opaque: a resized photo goes in, a named output feature
/// comes out. Implementations must not retain frames between calls.
pub trait InferenceBackend {
    /// Run the model on a frame already resized to [`input_size`](Self::input_size)
    fn infer(&mut self, input: &RgbImage) -> Result<ModelOutput, InferenceError>;

    /// Get the model's input dimensions
    ///
    /// Returns (width, height)
    fn input_size(&self) -> (u32, u32);
}
