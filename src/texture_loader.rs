use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::{In, Reader, Tag, Value};
use tracing::{debug, warn};

use crate::error::{ImageBoxError, Result};
use crate::pixels::PixelBuffer;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Turns a path into pixels. Implemented for plain closures so callers can
/// supply decoded images from anywhere.
pub trait ImageLoader {
    fn load(&self, path: &Path) -> Result<PixelBuffer>;
}

impl<F> ImageLoader for F
where
    F: Fn(&Path) -> Result<PixelBuffer>,
{
    fn load(&self, path: &Path) -> Result<PixelBuffer> {
        self(path)
    }
}

/// Decodes image files from disk, honoring the EXIF orientation of JPEGs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl ImageLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<PixelBuffer> {
        load_image_with_exif_rotation(path)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

// --- Helper: Load and Sort Image Paths ---
pub fn load_sorted_image_paths(dir_path: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(dir_path).map_err(|e| ImageBoxError::load(dir_path, e))?;

    for entry in entries {
        let path = entry.map_err(|e| ImageBoxError::load(dir_path, e))?.path();
        if path.is_file() && has_image_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if paths.is_empty() {
        Err(ImageBoxError::load(dir_path, "no image files found in directory"))
    } else {
        Ok(paths)
    }
}

/// Expands directories into their sorted image files; other paths pass through.
pub fn expand_image_paths<I, P>(inputs: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut paths = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            paths.extend(load_sorted_image_paths(input)?);
        } else {
            paths.push(input.to_path_buf());
        }
    }
    Ok(paths)
}

fn exif_orientation(file_bytes: &[u8], image_path: &Path) -> u16 {
    match Reader::new().read_from_container(&mut Cursor::new(file_bytes)) {
        Ok(exif) => match exif.get_field(Tag::Orientation, In::PRIMARY).map(|field| &field.value) {
            Some(Value::Short(values)) if !values.is_empty() => values[0],
            _ => 1,
        },
        Err(e) => {
            // non-critical, proceed without rotation
            warn!(path = %image_path.display(), error = %e, "could not read EXIF data");
            1
        }
    }
}

// --- Load Image, Apply EXIF Rotation ---
pub fn load_image_with_exif_rotation(image_path: &Path) -> Result<PixelBuffer> {
    let file_bytes = fs::read(image_path).map_err(|e| ImageBoxError::load(image_path, e))?;

    // EXIF is only read reliably from JPEG
    let extension = image_path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase();
    let orientation = if extension == "jpg" || extension == "jpeg" {
        exif_orientation(&file_bytes, image_path)
    } else {
        1
    };

    let image = image::load_from_memory(&file_bytes).map_err(|e| ImageBoxError::load(image_path, e))?;

    // 1 = Top-left (Normal)
    // 2 / 4 = mirrored horizontally / vertically
    // 3 = Bottom-right (180 deg)
    // 5 / 7 = mirrored, then rotated
    // 6 = Top-right (90 deg clockwise)
    // 8 = Bottom-left (90 deg counter-clockwise)
    let image = match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    };
    if orientation != 1 {
        debug!(path = %image_path.display(), orientation, "applied EXIF orientation");
    }

    Ok(PixelBuffer::from_dynamic(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("imagebox-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn lists_only_image_files_sorted_by_name() {
        let dir = scratch_dir("listing");
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.gif"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        let names: Vec<_> = load_sorted_image_paths(&dir)
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.jpg", "b.PNG", "c.gif"]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn empty_directory_is_a_load_error() {
        let dir = scratch_dir("empty");
        assert!(matches!(load_sorted_image_paths(&dir), Err(ImageBoxError::Load { .. })));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn decodes_png_from_disk() {
        let dir = scratch_dir("decode");
        let path = dir.join("red.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([255, 0, 0])).save(&path).unwrap();

        let pixels = FsLoader.load(&path).unwrap();
        assert_eq!((pixels.width(), pixels.height(), pixels.channels()), (3, 2, 3));
        assert_eq!(pixels.pixel(2, 1), &[255, 0, 0]);

        let expanded = expand_image_paths([dir.as_path()]).unwrap();
        assert_eq!(expanded, vec![path]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn undecodable_file_is_a_load_error() {
        let dir = scratch_dir("garbage");
        let path = dir.join("broken.png");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(FsLoader.load(&path), Err(ImageBoxError::Load { .. })));
        assert!(matches!(FsLoader.load(&dir.join("missing.png")), Err(ImageBoxError::Load { .. })));
        fs::remove_dir_all(dir).unwrap();
    }
}
