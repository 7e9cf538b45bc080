mod chroma;
mod preprocess;
mod scheduler;
mod selfie;
pub mod types;

pub use chroma::ChromaKeyMatter;
pub use preprocess::Preprocessor;
pub use scheduler::MatteScheduler;
pub use selfie::SelfieSegmenter;
pub use types::{Matte, SegmentationModel};

use crate::error::Result;

/// Create the default segmentation model (selfie-style ONNX graph)
pub fn create_default_model(model_path: &str) -> Result<Box<dyn SegmentationModel>> {
    let model = SelfieSegmenter::new(model_path)?;
    Ok(Box::new(model))
}
