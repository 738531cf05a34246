use super::types::{InferenceBackend, InferenceError, ModelOutput, OutputValue};
use crate::buffer::{PixelFormat, ScalarImageBuffer};
use image::RgbImage;
use ndarray::{Array1, Array2, Array4};
use std::path::{Path, PathBuf};

/// What a dumped model output holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Single-channel image buffer
    Image(PixelFormat),
    /// Float32 depth in meters, `[1, 1, H, W]`
    DepthMeters,
    /// Int32 class ids, `[H, W]`
    ClassMap,
    /// Float32 probabilities, `width` entries (height is 1)
    Probabilities,
}

impl OutputKind {
    fn element_size(self) -> usize {
        match self {
            OutputKind::Image(format) => format.element_size(),
            OutputKind::DepthMeters | OutputKind::ClassMap | OutputKind::Probabilities => 4,
        }
    }
}

/// Shape of a tightly packed, little-endian model output dump
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawLayout {
    pub width: u32,
    pub height: u32,
    pub kind: OutputKind,
}

impl RawLayout {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.kind.element_size()
    }
}

/// Decode a raw dump into a typed output value
pub fn decode_output(bytes: &[u8], layout: &RawLayout) -> Result<OutputValue, InferenceError> {
    let expected = layout.expected_len();
    if bytes.len() != expected {
        return Err(InferenceError::OutputLength {
            expected,
            actual: bytes.len(),
        });
    }

    let (w, h) = (layout.width as usize, layout.height as usize);
    let value = match layout.kind {
        OutputKind::Image(format) => OutputValue::Image(ScalarImageBuffer::from_raw(
            layout.width,
            layout.height,
            format,
            w * format.element_size(),
            bytes.to_vec(),
        )?),
        OutputKind::DepthMeters => {
            OutputValue::DepthMeters(Array4::from_shape_vec((1, 1, h, w), le_f32(bytes))?)
        }
        OutputKind::ClassMap => OutputValue::ClassMap(Array2::from_shape_vec((h, w), le_i32(bytes))?),
        OutputKind::Probabilities => OutputValue::Probabilities(Array1::from_vec(le_f32(bytes))),
    };
    Ok(value)
}

fn le_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn le_i32(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Backend that replays a model output captured from a real runtime
///
/// Lets the post-processing run on machines without the model runtime: the
/// output feature is read from disk each time `infer` is called.
pub struct ReplayBackend {
    path: PathBuf,
    label: String,
    layout: RawLayout,
    input_size: (u32, u32),
}

impl ReplayBackend {
    pub fn new<P: AsRef<Path>>(
        path: P,
        label: impl Into<String>,
        layout: RawLayout,
        input_size: (u32, u32),
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            label: label.into(),
            layout,
            input_size,
        }
    }
}

impl InferenceBackend for ReplayBackend {
    fn infer(&mut self, input: &RgbImage) -> Result<ModelOutput, InferenceError> {
        if input.dimensions() != self.input_size {
            return Err(InferenceError::InputSize {
                expected: self.input_size,
                actual: input.dimensions(),
            });
        }

        tracing::debug!("Replaying '{}' from {}", self.label, self.path.display());
        let bytes = std::fs::read(&self.path).map_err(|source| InferenceError::Read {
            path: self.path.clone(),
            source,
        })?;

        Ok(ModelOutput {
            label: self.label.clone(),
            value: decode_output(&bytes, &self.layout)?,
        })
    }

    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}
