use super::policy::{Corner, Label};
use crate::error::{BoothError, Result};
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// Peak darkening at the farthest corner from the canvas center
const VIGNETTE_MAX_ALPHA: f32 = 0.3;

/// Overlay alpha at (x, y): 0 at the canvas center, rising quadratically
/// to [`VIGNETTE_MAX_ALPHA`] at the farthest corner.
pub fn vignette_alpha(x: u32, y: u32, width: u32, height: u32) -> f32 {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_dist_sq = cx * cx + cy * cy;
    if max_dist_sq == 0.0 {
        return 0.0;
    }
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    VIGNETTE_MAX_ALPHA * (dx * dx + dy * dy) / max_dist_sq
}

/// Darken the canvas edges with a radial falloff
pub fn apply_vignette(canvas: &mut RgbImage) {
    let (width, height) = canvas.dimensions();
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let keep = 1.0 - vignette_alpha(x, y, width, height);
        for channel in pixel.0.iter_mut() {
            *channel = (*channel as f32 * keep).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Draw the label text at its corner, inset from the edges
pub fn draw_label(canvas: &mut RgbImage, label: &Label) -> Result<()> {
    let bytes = std::fs::read(&label.font_path).map_err(|e| BoothError::AssetLoad {
        path: label.font_path.clone(),
        reason: e.to_string(),
    })?;
    let font = FontVec::try_from_vec(bytes).map_err(|e| BoothError::AssetLoad {
        path: label.font_path.clone(),
        reason: format!("not a usable font: {e}"),
    })?;

    let scale = PxScale::from(label.size_px);
    let (text_w, text_h) = text_size(scale, &font, &label.text);
    let (cw, ch) = canvas.dimensions();
    let inset = label.inset_px as i32;

    let x = match label.corner {
        Corner::TopLeft | Corner::BottomLeft => inset,
        Corner::TopRight | Corner::BottomRight => cw as i32 - text_w as i32 - inset,
    };
    let y = match label.corner {
        Corner::TopLeft | Corner::TopRight => inset,
        Corner::BottomLeft | Corner::BottomRight => ch as i32 - text_h as i32 - inset,
    };

    draw_text_mut(canvas, Rgb(label.color), x, y, scale, &font, &label.text);
    Ok(())
}
