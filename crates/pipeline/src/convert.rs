//! Conversions between encoded payloads, in-memory images, videos and
//! temporary files.

use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use mjnodes_core::error::CoreError;
use mjnodes_core::params::ImageStager;

/// Prefix of staged image files.
pub const TEMP_IMAGE_PREFIX: &str = "mj_img_";

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid video payload: {0}")]
    InvalidVideo(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode any supported image format into RGB8.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ConvertError> {
    let img = image::load_from_memory(bytes).map_err(ConvertError::Decode)?;
    Ok(img.to_rgb8())
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, ConvertError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(ConvertError::Encode)?;
    Ok(buf.into_inner())
}

/// Write an image as PNG to `path`.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<(), ConvertError> {
    img.save_with_format(path, ImageFormat::Png)
        .map_err(ConvertError::Encode)
}

/// Write an image to a persisted temporary `.png` file and return its path.
///
/// The file is not removed on drop; the service client uploads it later.
pub fn image_to_temp_file(img: &RgbImage) -> Result<PathBuf, ConvertError> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_IMAGE_PREFIX)
        .suffix(".png")
        .tempfile()?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        img.write_to(&mut writer, ImageFormat::Png)
            .map_err(ConvertError::Encode)?;
        writer.flush()?;
    }
    let path = file.into_temp_path().keep().map_err(|e| e.error)?;
    Ok(path)
}

/// [`ImageStager`] that writes reference images to temp files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TempFileStager;

impl ImageStager for TempFileStager {
    fn stage(&self, image: &RgbImage) -> Result<String, CoreError> {
        let path = image_to_temp_file(image)
            .map_err(|e| CoreError::Internal(format!("Failed to stage image: {e}")))?;
        tracing::debug!(path = %path.display(), "Staged image");
        Ok(path.to_string_lossy().into_owned())
    }
}

/* --------------------------------------------------------------------------
   Video
   -------------------------------------------------------------------------- */

/// An encoded MP4 held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoClip {
    bytes: Vec<u8>,
}

impl VideoClip {
    /// Wrap raw MP4 bytes. Requires an `ftyp` box at the start.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ConvertError> {
        if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
            return Err(ConvertError::InvalidVideo(format!(
                "missing MP4 ftyp header ({} bytes)",
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ConvertError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use image::Rgb;

    use super::*;

    fn checker() -> RgbImage {
        RgbImage::from_fn(4, 3, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        })
    }

    /// Smallest header `VideoClip` accepts.
    fn mp4_stub() -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 20];
        bytes.extend_from_slice(b"ftypisom");
        bytes.extend_from_slice(&[0; 8]);
        bytes
    }

    #[test]
    fn decode_png_to_rgb() {
        let png = encode_png(&checker()).unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded, checker());
    }

    #[test]
    fn decode_garbage_fails() {
        assert_matches!(decode_image(b"not an image"), Err(ConvertError::Decode(_)));
    }

    #[test]
    fn temp_file_is_persisted_png() {
        let path = image_to_temp_file(&checker()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(TEMP_IMAGE_PREFIX));
        assert!(name.ends_with(".png"));

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded, checker());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn stager_returns_existing_path() {
        let path = TempFileStager.stage(&checker()).unwrap();
        assert!(Path::new(&path).is_file());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn video_requires_ftyp() {
        let clip = VideoClip::from_bytes(mp4_stub()).unwrap();
        assert_eq!(clip.len(), 20);
        assert_matches!(
            VideoClip::from_bytes(b"<html>not found</html>".to_vec()),
            Err(ConvertError::InvalidVideo(_))
        );
        assert_matches!(VideoClip::from_bytes(vec![]), Err(ConvertError::InvalidVideo(_)));
    }

    #[test]
    fn video_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        VideoClip::from_bytes(mp4_stub()).unwrap().write_to(&path).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), mp4_stub());
    }
}
