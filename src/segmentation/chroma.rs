use super::types::{Matte, SegmentationModel};
use crate::error::Result;
use image::RgbImage;

/// Chroma-key foreground isolation.
///
/// Classifies every pixel against a hue window in HSV space: pixels
/// inside the window (and saturated/bright enough to be keyed reliably)
/// are background, everything else is foreground. Works at native frame
/// resolution and needs no model file, so it slots behind the same
/// `Matte` pipeline as the ONNX backends.
pub struct ChromaKeyMatter {
    pub hue_deg: f32,
    pub hue_tolerance_deg: f32,
    pub min_saturation: f32,
    pub min_value: f32,
}

impl Default for ChromaKeyMatter {
    /// Green screen: hue 120 +/- 80 degrees, skipping pixels too dark or
    /// too desaturated to be part of the screen
    fn default() -> Self {
        Self {
            hue_deg: 120.0,
            hue_tolerance_deg: 80.0,
            min_saturation: 50.0 / 255.0,
            min_value: 50.0 / 255.0,
        }
    }
}

impl ChromaKeyMatter {
    fn is_key(&self, r: u8, g: u8, b: u8) -> bool {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        hue_distance(h, self.hue_deg) <= self.hue_tolerance_deg
            && s >= self.min_saturation
            && v >= self.min_value
    }
}

impl SegmentationModel for ChromaKeyMatter {
    fn segment(&mut self, frame: &RgbImage) -> Result<Matte> {
        let _span = tracing::debug_span!("chroma_key").entered();
        Ok(frame
            .pixels()
            .map(|p| if self.is_key(p[0], p[1], p[2]) { 0.0 } else { 1.0 })
            .collect())
    }
}

/// RGB to HSV: hue in degrees [0, 360), saturation and value in [0, 1]
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    (hue, saturation, max)
}

/// Shortest angular distance between two hues, in degrees
fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn matte_of(pixel: [u8; 3]) -> f32 {
        let frame = RgbImage::from_pixel(1, 1, Rgb(pixel));
        ChromaKeyMatter::default().segment(&frame).unwrap()[0]
    }

    #[test]
    fn pure_green_is_keyed_out() {
        assert_eq!(matte_of([0, 255, 0]), 0.0);
    }

    #[test]
    fn skin_tones_and_reds_survive() {
        assert_eq!(matte_of([200, 150, 120]), 1.0);
        assert_eq!(matte_of([200, 30, 30]), 1.0);
    }

    #[test]
    fn dark_or_washed_out_pixels_are_kept_as_foreground() {
        // Too dark to key reliably, even though the hue matches
        assert_eq!(matte_of([0, 30, 0]), 1.0);
        // No saturation at all
        assert_eq!(matte_of([128, 128, 128]), 1.0);
    }

    #[test]
    fn matte_is_row_major_and_frame_sized() {
        let mut frame = RgbImage::from_pixel(3, 2, Rgb([0, 255, 0]));
        frame.put_pixel(2, 1, Rgb([200, 30, 30]));

        let matte = ChromaKeyMatter::default().segment(&frame).unwrap();
        assert_eq!(matte.len(), 6);
        assert_eq!(matte[5], 1.0);
        assert_eq!(matte[0], 0.0);
    }

    #[test]
    fn hue_distance_wraps_around() {
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(120.0, 120.0), 0.0);
    }
}
