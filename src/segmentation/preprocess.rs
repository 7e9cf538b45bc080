use crate::error::Result;
use image::{imageops, RgbImage};
use ndarray::Array4;

/// Preprocessor for converting RGB images to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    /// Preprocess an RGB image into a normalized NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Convert to float and normalize to [0, 1]
    /// 3. Transpose from HWC to NCHW format
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> Result<Array4<f32>> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for y in 0..height {
            for x in 0..width {
                let pixel = resized.get_pixel(x, y);

                let r = pixel[0] as f32 / 255.0;
                let g = pixel[1] as f32 / 255.0;
                let b = pixel[2] as f32 / 255.0;

                tensor[[0, 0, y as usize, x as usize]] = r;
                tensor[[0, 1, y as usize, x as usize]] = g;
                tensor[[0, 2, y as usize, x as usize]] = b;
            }
        }

        Ok(tensor)
    }

    /// Resize a model-resolution matte back to frame dimensions
    pub fn postprocess_matte(
        matte: &[f32],
        matte_width: u32,
        matte_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<Vec<f32>> {
        let _span = tracing::debug_span!("postprocess").entered();

        if matte_width == target_width && matte_height == target_height {
            return Ok(matte.to_vec());
        }

        // Round-trip through a grayscale image so we can reuse the image
        // crate's resampling
        let gray_image = image::GrayImage::from_fn(matte_width, matte_height, |x, y| {
            let idx = (y * matte_width + x) as usize;
            let value = (matte[idx] * 255.0).clamp(0.0, 255.0) as u8;
            image::Luma([value])
        });

        let resized = imageops::resize(
            &gray_image,
            target_width,
            target_height,
            imageops::FilterType::Lanczos3,
        );

        let output: Vec<f32> = resized.pixels().map(|p| p[0] as f32 / 255.0).collect();

        Ok(output)
    }

    /// Snap matte values to 0.0 or 1.0 around a confidence threshold
    pub fn binarize(matte: &mut [f32], threshold: f32) {
        for value in matte.iter_mut() {
            *value = if *value > threshold { 1.0 } else { 0.0 };
        }
    }

    /// Soften matte edges with a Gaussian blur so the composited subject
    /// does not cut out with a hard, jagged silhouette
    pub fn feather(matte: &[f32], width: u32, height: u32, sigma: f32) -> Vec<f32> {
        if sigma <= 0.0 {
            return matte.to_vec();
        }

        let gray_image = image::GrayImage::from_fn(width, height, |x, y| {
            let idx = (y * width + x) as usize;
            let value = (matte[idx] * 255.0).clamp(0.0, 255.0) as u8;
            image::Luma([value])
        });

        let blurred = imageops::blur(&gray_image, sigma);
        blurred.pixels().map(|p| p[0] as f32 / 255.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn preprocess_normalizes_to_unit_range() {
        let mut img = RgbImage::new(4, 4);
        img.put_pixel(0, 0, Rgb([255, 0, 128]));

        let pre = Preprocessor::new(4, 4);
        let tensor = pre.preprocess(&img).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 4, 4]);
        assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 0]], 0.0);
        assert!((tensor[[0, 2, 0, 0]] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn postprocess_is_identity_at_matching_size() {
        let matte = vec![0.0, 0.25, 0.5, 1.0];
        let out = Preprocessor::postprocess_matte(&matte, 2, 2, 2, 2).unwrap();
        assert_eq!(out, matte);
    }

    #[test]
    fn binarize_applies_threshold() {
        let mut matte = vec![0.1, 0.79, 0.81, 1.0];
        Preprocessor::binarize(&mut matte, 0.8);
        assert_eq!(matte, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn feather_softens_a_step_edge() {
        // Left half background, right half foreground
        let matte: Vec<f32> = (0..8)
            .flat_map(|_| (0..8).map(|x| if x < 4 { 0.0 } else { 1.0 }))
            .collect();

        let soft = Preprocessor::feather(&matte, 8, 8, 1.0);
        assert_eq!(soft.len(), 64);

        // Pixels at the edge become partial coverage
        let edge = soft[4 * 8 + 3];
        assert!(edge > 0.05 && edge < 0.95, "edge value {edge}");

        // Pixels far from the edge stay what they were
        assert!(soft[4 * 8] < 0.1);
        assert!(soft[4 * 8 + 7] > 0.9);
    }

    #[test]
    fn feather_with_zero_sigma_is_identity() {
        let matte = vec![0.0, 1.0, 0.5, 0.25];
        assert_eq!(Preprocessor::feather(&matte, 2, 2, 0.0), matte);
    }
}
