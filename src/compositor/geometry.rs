//! Pure placement math
//!
//! Everything here is a deterministic function of raster dimensions and
//! the policy; no raster data is touched. Zero-sized inputs are rejected
//! so callers cannot run layout before dimensions are known.

use super::policy::{BackgroundFit, ForegroundFit, OutputSize, VerticalAnchor};
use crate::error::{BoothError, Result};

/// Scaled size and top-left position of a raster on the canvas.
/// Offsets may be negative when the raster overflows (cover crop).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

fn check_dims(what: &'static str, (width, height): (u32, u32)) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(BoothError::InvalidDimensions {
            what,
            width,
            height,
        });
    }
    Ok(())
}

/// Output canvas dimensions for a policy. Never a function of the frame.
pub fn canvas_size(output_size: OutputSize, background: (u32, u32)) -> Result<(u32, u32)> {
    check_dims("background", background)?;
    let size = match output_size {
        OutputSize::Fixed { width, height } => (width, height),
        OutputSize::MatchBackground => background,
    };
    check_dims("canvas", size)?;
    Ok(size)
}

/// Where the background lands on the canvas
pub fn background_placement(
    canvas: (u32, u32),
    background: (u32, u32),
    fit: BackgroundFit,
) -> Result<Placement> {
    check_dims("canvas", canvas)?;
    check_dims("background", background)?;

    let (cw, ch) = (canvas.0 as f32, canvas.1 as f32);
    let (bw, bh) = (background.0 as f32, background.1 as f32);

    let placement = match fit {
        BackgroundFit::Stretch => Placement {
            scale: 1.0,
            width: canvas.0,
            height: canvas.1,
            x: 0,
            y: 0,
        },
        BackgroundFit::Cover => {
            let scale = (cw / bw).max(ch / bh);
            let width = (bw * scale).round() as u32;
            let height = (bh * scale).round() as u32;
            Placement {
                scale,
                width,
                height,
                x: -((width as i64 - canvas.0 as i64) / 2),
                y: -((height as i64 - canvas.1 as i64) / 2),
            }
        }
        BackgroundFit::Contain { fill } => {
            let scale = (cw / bw).min(ch / bh) * fill;
            let width = (bw * scale).round() as u32;
            let height = (bh * scale).round() as u32;
            Placement {
                scale,
                width,
                height,
                x: (canvas.0 as i64 - width as i64) / 2,
                y: (canvas.1 as i64 - height as i64) / 2,
            }
        }
    };
    Ok(placement)
}

/// Where the (mirrored) foreground lands on the canvas
pub fn foreground_placement(
    canvas: (u32, u32),
    frame: (u32, u32),
    fit: ForegroundFit,
    anchor: VerticalAnchor,
) -> Result<Placement> {
    check_dims("canvas", canvas)?;
    check_dims("frame", frame)?;

    let (cw, ch) = (canvas.0 as f32, canvas.1 as f32);
    let (fw, fh) = (frame.0 as f32, frame.1 as f32);

    let scale = match fit {
        ForegroundFit::FractionOfHeight(fraction) => (ch * fraction) / fh,
        ForegroundFit::Contain(fraction) => (cw / fw).min(ch / fh) * fraction,
    };

    let width = (fw * scale).round() as u32;
    let height = (fh * scale).round() as u32;

    let x = (canvas.0 as i64 - width as i64) / 2;
    let y = match anchor {
        VerticalAnchor::Center => (canvas.1 as i64 - height as i64) / 2,
        VerticalAnchor::Bottom { inset_px } => {
            canvas.1 as i64 - height as i64 - inset_px as i64
        }
        VerticalAnchor::OffsetFraction(fraction) => (ch * fraction).round() as i64,
    };

    Ok(Placement {
        scale,
        width,
        height,
        x,
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_size_ignores_frame_and_follows_policy() {
        let fixed = OutputSize::Fixed {
            width: 1920,
            height: 1080,
        };
        assert_eq!(canvas_size(fixed, (640, 480)).unwrap(), (1920, 1080));
        assert_eq!(canvas_size(fixed, (4000, 3000)).unwrap(), (1920, 1080));
        assert_eq!(
            canvas_size(OutputSize::MatchBackground, (800, 600)).unwrap(),
            (800, 600)
        );
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = canvas_size(OutputSize::MatchBackground, (0, 600)).unwrap_err();
        assert!(matches!(err, BoothError::InvalidDimensions { .. }));

        let err = foreground_placement(
            (1920, 1080),
            (1280, 0),
            ForegroundFit::Contain(0.9),
            VerticalAnchor::Center,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BoothError::InvalidDimensions { what: "frame", .. }
        ));
    }

    #[test]
    fn bottom_anchored_sixty_percent_example() {
        // 1080 * 0.6 = 648 target height, frame 720 tall -> scale 0.9
        let p = foreground_placement(
            (1920, 1080),
            (1280, 720),
            ForegroundFit::FractionOfHeight(0.6),
            VerticalAnchor::Bottom { inset_px: 20 },
        )
        .unwrap();

        assert!((p.scale - 0.9).abs() < 1e-6);
        assert_eq!((p.width, p.height), (1152, 648));
        assert_eq!(p.x, 384);
        assert_eq!(p.y, 412);
    }

    #[test]
    fn contain_fit_with_margin_is_centered() {
        // min(1920/1280, 1080/720) = 1.5, * 0.9 = 1.35
        let p = foreground_placement(
            (1920, 1080),
            (1280, 720),
            ForegroundFit::Contain(0.9),
            VerticalAnchor::Center,
        )
        .unwrap();

        assert!((p.scale - 1.35).abs() < 1e-6);
        assert_eq!((p.width, p.height), (1728, 972));
        assert_eq!(p.x, (1920 - 1728) / 2);
        assert_eq!(p.y, (1080 - 972) / 2);
    }

    #[test]
    fn cover_background_crops_symmetrically() {
        // 4:3 background on a 16:9 canvas scales by width and crops height
        let p = background_placement((1920, 1080), (1600, 1200), BackgroundFit::Cover).unwrap();
        assert_eq!((p.width, p.height), (1920, 1440));
        assert_eq!(p.x, 0);
        assert_eq!(p.y, -180);
    }

    #[test]
    fn stretch_background_fills_exactly() {
        let p = background_placement((1920, 1080), (333, 777), BackgroundFit::Stretch).unwrap();
        assert_eq!((p.width, p.height), (1920, 1080));
        assert_eq!((p.x, p.y), (0, 0));
    }

    #[test]
    fn placement_is_reproducible() {
        let a = foreground_placement(
            (1920, 1080),
            (1280, 720),
            ForegroundFit::FractionOfHeight(0.33),
            VerticalAnchor::OffsetFraction(0.1),
        )
        .unwrap();
        let b = foreground_placement(
            (1920, 1080),
            (1280, 720),
            ForegroundFit::FractionOfHeight(0.33),
            VerticalAnchor::OffsetFraction(0.1),
        )
        .unwrap();
        assert_eq!(a, b);
    }
}
