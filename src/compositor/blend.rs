use super::geometry::{background_placement, canvas_size, foreground_placement};
use super::overlay;
use super::policy::PlacementPolicy;
use crate::error::{BoothError, Result};
use crate::segmentation::Matte;
use image::{imageops, Rgba, RgbaImage, RgbImage};

/// Mirror a frame horizontally (selfie convention)
pub fn mirror(frame: &RgbImage) -> RgbImage {
    imageops::flip_horizontal(frame)
}

/// Contrast/brightness lift for the captured frame, so the subject does
/// not look flat next to a bright background. Each channel maps to
/// `c * contrast + brightness`, clamped.
pub fn enhance(frame: &RgbImage, contrast: f32, brightness: f32) -> RgbImage {
    let (width, height) = frame.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let pixel = frame.get_pixel(x, y);
        image::Rgb([
            adjust_channel(pixel[0], contrast, brightness),
            adjust_channel(pixel[1], contrast, brightness),
            adjust_channel(pixel[2], contrast, brightness),
        ])
    })
}

fn adjust_channel(c: u8, contrast: f32, brightness: f32) -> u8 {
    (c as f32 * contrast + brightness).round().clamp(0.0, 255.0) as u8
}

/// Flatten background + (optionally matted) foreground + overlays into a
/// single composite raster.
///
/// The foreground is always mirrored before placement. With a matte, only
/// pixels the matte marks as foreground survive; everything else shows the
/// background through. Geometry is fully determined by the two input sizes
/// and the policy.
pub fn compose(
    background: &RgbImage,
    frame: &RgbImage,
    matte: Option<&Matte>,
    policy: &PlacementPolicy,
) -> Result<RgbImage> {
    let canvas_dims = canvas_size(policy.output_size, background.dimensions())?;
    let mut canvas = RgbImage::new(canvas_dims.0, canvas_dims.1);

    // Background layer
    let bg = background_placement(canvas_dims, background.dimensions(), policy.background_fit)?;
    let bg_scaled = if background.dimensions() == (bg.width, bg.height) {
        background.clone()
    } else {
        imageops::resize(background, bg.width, bg.height, imageops::FilterType::Lanczos3)
    };
    draw_opaque(&mut canvas, &bg_scaled, bg.x, bg.y);

    // Foreground layer
    let (fw, fh) = frame.dimensions();
    let fg = foreground_placement(canvas_dims, (fw, fh), policy.foreground_fit, policy.anchor)?;

    let mirrored = mirror(frame);
    let layer = match matte {
        Some(matte) => {
            if matte.len() != (fw as usize) * (fh as usize) {
                return Err(BoothError::Segmentation(format!(
                    "matte has {} values for a {}x{} frame",
                    matte.len(),
                    fw,
                    fh
                )));
            }
            with_matte_alpha(&mirrored, matte)
        }
        None => opaque_alpha(&mirrored),
    };

    let layer_scaled = if layer.dimensions() == (fg.width, fg.height) {
        layer
    } else {
        imageops::resize(&layer, fg.width, fg.height, imageops::FilterType::Lanczos3)
    };
    draw_blended(&mut canvas, &layer_scaled, fg.x, fg.y);

    // Decorative overlays
    if policy.vignette {
        overlay::apply_vignette(&mut canvas);
    }
    if let Some(label) = &policy.label {
        overlay::draw_label(&mut canvas, label)?;
    }

    Ok(canvas)
}

/// Attach the matte as an alpha channel to an already-mirrored frame.
/// The matte is indexed in unmirrored coordinates, so columns are flipped
/// to stay aligned.
fn with_matte_alpha(mirrored: &RgbImage, matte: &[f32]) -> RgbaImage {
    let (width, height) = mirrored.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let pixel = mirrored.get_pixel(x, y);
        let src_x = width - 1 - x;
        let alpha = matte[(y * width + src_x) as usize];
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([pixel[0], pixel[1], pixel[2], a])
    })
}

fn opaque_alpha(frame: &RgbImage) -> RgbaImage {
    let (width, height) = frame.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let pixel = frame.get_pixel(x, y);
        Rgba([pixel[0], pixel[1], pixel[2], 255])
    })
}

/// Copy `src` onto `canvas` at (ox, oy), clipping at the canvas edges
fn draw_opaque(canvas: &mut RgbImage, src: &RgbImage, ox: i64, oy: i64) {
    let (cw, ch) = canvas.dimensions();
    for (x, y, pixel) in src.enumerate_pixels() {
        let cx = ox + x as i64;
        let cy = oy + y as i64;
        if (0..cw as i64).contains(&cx) && (0..ch as i64).contains(&cy) {
            canvas.put_pixel(cx as u32, cy as u32, *pixel);
        }
    }
}

/// Alpha-blend `src` onto `canvas` at (ox, oy), clipping at the edges
fn draw_blended(canvas: &mut RgbImage, src: &RgbaImage, ox: i64, oy: i64) {
    let (cw, ch) = canvas.dimensions();
    for (x, y, pixel) in src.enumerate_pixels() {
        let cx = ox + x as i64;
        let cy = oy + y as i64;
        if !(0..cw as i64).contains(&cx) || !(0..ch as i64).contains(&cy) {
            continue;
        }
        let alpha = pixel[3] as f32 / 255.0;
        if alpha <= 0.0 {
            continue;
        }
        let under = canvas.get_pixel(cx as u32, cy as u32);
        let blended = image::Rgb([
            blend_channel(pixel[0], under[0], alpha),
            blend_channel(pixel[1], under[1], alpha),
            blend_channel(pixel[2], under[2], alpha),
        ]);
        canvas.put_pixel(cx as u32, cy as u32, blended);
    }
}

fn blend_channel(over: u8, under: u8, alpha: f32) -> u8 {
    (over as f32 * alpha + under as f32 * (1.0 - alpha))
        .round()
        .clamp(0.0, 255.0) as u8
}
