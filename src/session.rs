//! Booth session: Idle -> CameraActive -> Captured -> (CameraActive via
//! "new photo"). Owns the one active capture source and the one current
//! composite; both invariants are structural, the state is derived from
//! which of the two is held.

use crate::capture::CaptureSource;
use crate::error::{BoothError, Result};
use image::RgbImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothState {
    Idle,
    CameraActive,
    Captured,
}

impl BoothState {
    pub fn name(self) -> &'static str {
        match self {
            BoothState::Idle => "Idle",
            BoothState::CameraActive => "CameraActive",
            BoothState::Captured => "Captured",
        }
    }
}

pub struct BoothSession<C, F>
where
    C: CaptureSource,
    F: FnMut() -> Result<C>,
{
    open: F,
    source: Option<C>,
    composite: Option<RgbImage>,
}

impl<C, F> BoothSession<C, F>
where
    C: CaptureSource,
    F: FnMut() -> Result<C>,
{
    /// `open` acquires the device; it is called again on every return to
    /// `CameraActive` — no state caches a previous device handle.
    pub fn new(open: F) -> Self {
        Self {
            open,
            source: None,
            composite: None,
        }
    }

    pub fn state(&self) -> BoothState {
        if self.source.is_some() {
            BoothState::CameraActive
        } else if self.composite.is_some() {
            BoothState::Captured
        } else {
            BoothState::Idle
        }
    }

    fn expect_state(&self, wanted: BoothState, operation: &'static str) -> Result<()> {
        let state = self.state();
        if state != wanted {
            return Err(BoothError::InvalidState {
                state: state.name(),
                operation,
            });
        }
        Ok(())
    }

    /// Acquire the camera. On failure the session stays `Idle` and the
    /// `DeviceUnavailable` error propagates; no automatic retry.
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(BoothState::Idle, "start camera")?;
        let source = (self.open)()?;
        tracing::info!("Camera active at {:?}", source.resolution());
        self.source = Some(source);
        Ok(())
    }

    /// Grab one frame from the active source
    pub fn grab_frame(&mut self) -> Result<RgbImage> {
        self.source_mut("grab frame")?.capture_frame()
    }

    /// Borrow the active source, e.g. for warm-up
    pub fn source_mut(&mut self, operation: &'static str) -> Result<&mut C> {
        let state = self.state();
        self.source.as_mut().ok_or(BoothError::InvalidState {
            state: state.name(),
            operation,
        })
    }

    /// Store the finished composite and release the camera
    pub fn store_composite(&mut self, composite: RgbImage) -> Result<()> {
        self.expect_state(BoothState::CameraActive, "store composite")?;
        self.source = None;
        self.composite = Some(composite);
        Ok(())
    }

    /// The current composite, if one capture has completed
    pub fn composite(&self) -> Option<&RgbImage> {
        self.composite.as_ref()
    }

    /// Discard the composite unconditionally and re-acquire the device
    pub fn retake(&mut self) -> Result<()> {
        self.expect_state(BoothState::Captured, "take new photo")?;
        self.composite = None;
        self.start()
    }

    /// Release the capture source. Idempotent; a no-op when nothing is
    /// held.
    pub fn release(&mut self) {
        if self.source.take().is_some() {
            tracing::info!("Camera released");
        }
    }
}
