use crate::buffer::PixelFormat;

/// Input resolution and output feature of the bundled sample models
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelPreset {
    /// DepthPro normalized inverse depth
    DepthPro,
    /// Depth Anything V2, still images
    DepthAnything,
    /// Depth Anything V2, live camera feed
    DepthAnythingLive,
    /// DETR ResNet-50 semantic segmentation
    DetrSegmentation,
    /// FastViT image classifier
    FastVit,
}

impl ModelPreset {
    /// (width, height) the model takes as input
    pub fn input_size(self) -> (u32, u32) {
        match self {
            ModelPreset::DepthPro => (1536, 1536),
            ModelPreset::DepthAnything => (686, 518),
            ModelPreset::DepthAnythingLive => (518, 392),
            ModelPreset::DetrSegmentation => (448, 448),
            ModelPreset::FastVit => (256, 256),
        }
    }

    /// Name of the output feature holding the result
    pub fn output_feature(self) -> &'static str {
        match self {
            ModelPreset::DepthPro => "normalized_inverse_depth",
            ModelPreset::DepthAnything | ModelPreset::DepthAnythingLive => "depth",
            ModelPreset::DetrSegmentation => "semanticPredictions",
            ModelPreset::FastVit => "classLabel_probs",
        }
    }

    /// Element format of the output image, `None` for models that return
    /// class maps or probabilities
    pub fn output_format(self) -> Option<PixelFormat> {
        match self {
            ModelPreset::DepthPro | ModelPreset::DepthAnything | ModelPreset::DepthAnythingLive => {
                Some(PixelFormat::Half16)
            }
            ModelPreset::DetrSegmentation | ModelPreset::FastVit => None,
        }
    }

    /// Whether the output is divided by 255 before display
    pub fn normalizes_output(self) -> bool {
        matches!(self, ModelPreset::DepthPro)
    }
}
