mod webcam;

pub use webcam::WebcamCapture;

use crate::error::Result;
use image::RgbImage;

/// Trait for camera capture sources
pub trait CaptureSource {
    /// Capture a single frame
    fn capture_frame(&mut self) -> Result<RgbImage>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);

    /// Grab and discard frames so auto-exposure can settle
    fn warm_up(&mut self, frames: u32) -> Result<()> {
        for _ in 0..frames {
            self.capture_frame()?;
        }
        Ok(())
    }
}
