use std::path::PathBuf;

/// How the output canvas dimensions are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSize {
    /// Fixed canvas, independent of any input raster
    Fixed { width: u32, height: u32 },
    /// Canvas matches the background's natural dimensions
    MatchBackground,
}

/// How the background raster fills the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundFit {
    /// Distort to cover the canvas exactly
    Stretch,
    /// Scale to cover, center-cropping the overflow
    Cover,
    /// Scale to fit inside, centered, letterboxed on black.
    /// `fill` shrinks the fitted size further (1.0 = touch the edges)
    Contain { fill: f32 },
}

/// How the foreground is scaled relative to the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForegroundFit {
    /// Scale so the foreground height is this fraction of canvas height
    FractionOfHeight(f32),
    /// Scale to fit inside the canvas, then shrink to this fraction
    Contain(f32),
}

/// Vertical position of the (horizontally centered) foreground
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerticalAnchor {
    Center,
    /// Bottom edge sits `inset_px` above the canvas bottom
    Bottom { inset_px: u32 },
    /// Top edge sits at this fraction of canvas height
    OffsetFraction(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Decorative text drawn at a fixed corner after foreground placement
#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
    pub font_path: PathBuf,
    pub size_px: f32,
    pub color: [u8; 3],
    pub corner: Corner,
    pub inset_px: u32,
}

impl Label {
    /// Booth default: bold-ish white text 40px in from the bottom-right
    pub fn booth_default(text: String, font_path: PathBuf) -> Self {
        Self {
            text,
            font_path,
            size_px: 48.0,
            color: [255, 255, 255],
            corner: Corner::BottomRight,
            inset_px: 40,
        }
    }
}

/// Full set of geometric parameters controlling one composite
#[derive(Debug, Clone)]
pub struct PlacementPolicy {
    pub output_size: OutputSize,
    pub background_fit: BackgroundFit,
    pub foreground_fit: ForegroundFit,
    pub anchor: VerticalAnchor,
    pub label: Option<Label>,
    pub vignette: bool,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            output_size: OutputSize::Fixed {
                width: 1920,
                height: 1080,
            },
            background_fit: BackgroundFit::Cover,
            foreground_fit: ForegroundFit::Contain(0.9),
            anchor: VerticalAnchor::Center,
            label: None,
            vignette: false,
        }
    }
}
