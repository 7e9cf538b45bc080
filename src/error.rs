use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoothError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("failed to load asset {path}: {reason}")]
    AssetLoad { path: PathBuf, reason: String },

    #[error("segmentation model failed to initialize: {0}")]
    SegmentationInit(String),

    #[error("segmentation failed: {0}")]
    Segmentation(String),

    #[error("invalid {what} dimensions {width}x{height}")]
    InvalidDimensions {
        what: &'static str,
        width: u32,
        height: u32,
    },

    #[error("operation not allowed in state {state}: {operation}")]
    InvalidState {
        state: &'static str,
        operation: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, BoothError>;
