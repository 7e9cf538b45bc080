use super::CaptureSource;
use crate::error::{BoothError, Result};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

pub struct WebcamCapture {
    camera: Camera,
    width: u32,
    height: u32,
}

impl WebcamCapture {
    /// Open a camera by index, asking for the closest match to the
    /// requested resolution. Permission or enumeration failures surface
    /// as [`BoothError::DeviceUnavailable`].
    pub fn new(device_index: u32, width: u32, height: u32) -> Result<Self> {
        tracing::info!(
            "Opening camera {} with resolution hint {}x{}",
            device_index,
            width,
            height
        );

        let index = CameraIndex::Index(device_index);
        let hint = CameraFormat::new(Resolution::new(width, height), FrameFormat::MJPEG, 30);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(hint));

        let mut camera = Camera::new(index, requested)
            .map_err(|e| BoothError::DeviceUnavailable(format!("cannot open camera: {e}")))?;

        camera
            .open_stream()
            .map_err(|e| BoothError::DeviceUnavailable(format!("cannot start stream: {e}")))?;

        let resolution = camera.resolution();
        tracing::info!(
            "Camera streaming at {}x{}",
            resolution.width(),
            resolution.height()
        );

        Ok(Self {
            camera,
            width: resolution.width(),
            height: resolution.height(),
        })
    }
}

impl CaptureSource for WebcamCapture {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| BoothError::DeviceUnavailable(format!("frame grab failed: {e}")))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| BoothError::DeviceUnavailable(format!("frame decode failed: {e}")))?;

        Ok(decoded)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
