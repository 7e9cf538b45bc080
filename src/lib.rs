//! snapbooth: webcam photo booth pipeline
//!
//! Capture a frame, optionally matte out the person with an ONNX model,
//! composite onto a static background under a deterministic placement
//! policy, and export the result as PNG.

pub mod assets;
pub mod capture;
pub mod compositor;
pub mod error;
pub mod output;
pub mod segmentation;
pub mod session;
