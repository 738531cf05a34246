mod presets;
mod replay;
pub mod types;

pub use presets::ModelPreset;
pub use replay::{decode_output, OutputKind, RawLayout, ReplayBackend};
pub use types::{InferenceBackend, InferenceError, ModelOutput, OutputValue};
