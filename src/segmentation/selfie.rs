use super::preprocess::Preprocessor;
use super::types::{Matte, SegmentationModel};
use crate::error::{BoothError, Result};
use image::RgbImage;
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;

/// Selfie-style person segmentation model
///
/// Expects an ONNX graph with a single normalized NCHW input and a single
/// one-channel confidence map output (1.0 = person). Stateless per frame,
/// so frames may be dropped between invocations without quality loss.
pub struct SelfieSegmenter {
    session: Session,
    preprocessor: Preprocessor,
}

impl SelfieSegmenter {
    /// Load a segmentation model from an ONNX file
    ///
    /// This is the one-time blocking initialization step; it must finish
    /// before any frame is processed. Failure disables the matted path
    /// only, never plain capture.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading segmentation model from {}", path.display());

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(4))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                BoothError::SegmentationInit(format!("{}: {e}", path.display()))
            })?;

        tracing::info!("Segmentation model loaded successfully");

        // 256x256 is the native resolution of the common selfie models;
        // the matte is resized back to frame dimensions afterwards
        let preprocessor = Preprocessor::new(256, 256);

        Ok(Self {
            session,
            preprocessor,
        })
    }
}

impl SegmentationModel for SelfieSegmenter {
    fn segment(&mut self, frame: &RgbImage) -> Result<Matte> {
        let _span = tracing::debug_span!("segment").entered();

        let input_tensor = self.preprocessor.preprocess(frame)?;

        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self
            .session
            .run(
                ort::inputs![input_tensor.view()]
                    .map_err(|e| BoothError::Segmentation(format!("bad input: {e}")))?,
            )
            .map_err(|e| BoothError::Segmentation(format!("inference failed: {e}")))?;
        drop(_infer_span);

        // Confidence map has shape [1, 1, H, W]
        let confidence = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| BoothError::Segmentation(format!("bad output: {e}")))?;
        let view = confidence.view();
        let shape = view.shape();
        let matte_height = shape[shape.len() - 2] as u32;
        let matte_width = shape[shape.len() - 1] as u32;

        let matte_flat: Vec<f32> = view.iter().copied().collect();

        let (frame_width, frame_height) = frame.dimensions();
        Preprocessor::postprocess_matte(
            &matte_flat,
            matte_width,
            matte_height,
            frame_width,
            frame_height,
        )
    }
}
