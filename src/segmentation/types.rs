use crate::error::Result;
use image::RgbImage;

/// Alpha matte: grayscale values where 0.0 = background, 1.0 = foreground
/// Dimensions match the input frame dimensions
pub type Matte = Vec<f32>;

/// Trait for foreground isolation backends
/// Allows swapping between different producers (selfie segmentation
/// models, chroma keying, MODNet, etc.)
pub trait SegmentationModel: Send {
    /// Process a frame and return an alpha matte
    ///
    /// # Arguments
    /// * `frame` - Input RGB frame
    ///
    /// # Returns
    /// * Alpha matte with values 0.0-1.0, flattened in row-major order,
    ///   sized to match the frame dimensions
    fn segment(&mut self, frame: &RgbImage) -> Result<Matte>;
}
