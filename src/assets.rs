use crate::error::{BoothError, Result};
use image::RgbImage;
use std::path::Path;

/// Load the static background image for the session.
///
/// A missing or unreadable file is `AssetLoad` and is fatal to the
/// feature; the background is immutable for the rest of the session.
pub fn load_background(path: &Path) -> Result<RgbImage> {
    let image = image::open(path)
        .map_err(|e| BoothError::AssetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .to_rgb8();

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(BoothError::InvalidDimensions {
            what: "background",
            width,
            height,
        });
    }

    tracing::info!("Background loaded: {} ({}x{})", path.display(), width, height);
    Ok(image)
}
