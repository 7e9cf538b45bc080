use crate::error::Result;
use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};

/// Filename for a capture: prefix plus the UTC timestamp truncated to
/// whole seconds, with `:` replaced by `-` so the name is portable.
pub fn photo_filename(prefix: &str, taken_at: DateTime<Utc>) -> String {
    format!("{prefix}-{}.png", taken_at.format("%Y-%m-%dT%H-%M-%S"))
}

/// Writes composites as lossless PNG files into one directory
pub struct PhotoWriter {
    output_dir: PathBuf,
    prefix: String,
}

impl PhotoWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, prefix: &str) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    /// Save a composite, stamping it with the current time
    pub fn save(&self, composite: &RgbImage) -> Result<PathBuf> {
        self.save_at(composite, Utc::now())
    }

    /// Save a composite with an explicit timestamp
    pub fn save_at(&self, composite: &RgbImage, taken_at: DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(photo_filename(&self.prefix, taken_at));
        composite.save_with_format(&path, ImageFormat::Png)?;
        tracing::info!("Saved photo to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn filename_truncates_to_seconds_and_swaps_colons() {
        assert_eq!(
            photo_filename("qubitx-photo", at("2024-01-02T03:04:05.678Z")),
            "qubitx-photo-2024-01-02T03-04-05.png"
        );
    }

    #[test]
    fn filename_keeps_prefix_verbatim() {
        assert_eq!(
            photo_filename("booth", at("1999-12-31T23:59:59Z")),
            "booth-1999-12-31T23-59-59.png"
        );
    }

    #[test]
    fn save_writes_a_png_into_the_output_dir() {
        let dir = std::env::temp_dir().join("snapbooth-export-test");
        let _ = std::fs::remove_dir_all(&dir);

        let writer = PhotoWriter::new(&dir, "shot");
        let composite = RgbImage::from_pixel(8, 8, image::Rgb([9, 9, 9]));
        let path = writer
            .save_at(&composite, at("2024-01-02T03:04:05Z"))
            .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "shot-2024-01-02T03-04-05.png"
        );
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded, composite);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
