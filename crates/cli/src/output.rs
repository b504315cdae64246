//! Reading inputs from and writing results to the local filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;

use mjnodes_pipeline::convert::{save_png, VideoClip};

/// Load an image file as RGB8.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;
    Ok(img.to_rgb8())
}

/// Path of the image for `slot` of `job_id` under `dir`.
pub fn image_path(dir: &Path, job_id: &str, slot: usize) -> PathBuf {
    dir.join(format!("{job_id}_{slot}.png"))
}

/// Path of video variant `index` of `job_id` under `dir`.
pub fn video_path(dir: &Path, job_id: &str, index: u8) -> PathBuf {
    dir.join(format!("{job_id}_{index}.mp4"))
}

/// Save present slots as PNGs and print one line per slot.
pub fn save_slots<'a, I>(dir: &Path, job_id: &str, slots: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = Option<&'a RgbImage>>,
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut saved = Vec::new();
    for (slot, img) in slots.into_iter().enumerate() {
        match img {
            Some(img) => {
                let path = image_path(dir, job_id, slot);
                save_png(img, &path)?;
                println!("image_{slot}: {}", path.display());
                saved.push(path);
            }
            None => println!("image_{slot}: -"),
        }
    }
    Ok(saved)
}

pub fn save_video(dir: &Path, job_id: &str, index: u8, clip: &VideoClip) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = video_path(dir, job_id, index);
    clip.write_to(&path)?;
    println!("video: {} ({} bytes)", path.display(), clip.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    #[test]
    fn absent_slots_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));

        let saved = save_slots(dir.path(), "job", [Some(&img), None, Some(&img), None]).unwrap();

        assert_eq!(
            saved,
            vec![image_path(dir.path(), "job", 0), image_path(dir.path(), "job", 2)]
        );
        assert_eq!(load_image(&saved[1]).unwrap(), img);
        assert!(!image_path(dir.path(), "job", 1).exists());
    }

    #[test]
    fn missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(&dir.path().join("nope.png")).is_err());
    }
}
