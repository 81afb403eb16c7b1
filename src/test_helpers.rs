//! Shared test utilities for the wysiwyg-resize test suite.
//!
//! Synthetic image fixtures and a small storage tree builder.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let storage = StorageTree::new();
//! let photo = storage.image("photo.jpg", 1000, 1000);
//! assert_eq!(dimensions_of(&photo), (1000, 1000));
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a gradient JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a semi-transparent RGBA PNG with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, 64, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Read the dimensions of an image on disk.
pub fn dimensions_of(path: &Path) -> (u32, u32) {
    image::image_dimensions(path)
        .unwrap_or_else(|e| panic!("cannot read dimensions of {}: {e}", path.display()))
}

// =========================================================================
// Storage tree
// =========================================================================

/// A temporary storage root with a `wysiwyg/` media directory inside it.
pub struct StorageTree {
    tmp: TempDir,
}

impl StorageTree {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("wysiwyg")).unwrap();
        Self { tmp }
    }

    /// Directory outside the storage root, for escape attempts.
    pub fn outside(&self) -> PathBuf {
        let dir = self.tmp.path().join("outside");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// The managed storage root.
    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("wysiwyg")
    }

    /// Create an image under the storage root; format follows the extension.
    pub fn image(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("png") => create_test_png(&path, width, height),
            _ => create_test_jpeg(&path, width, height),
        }
        path
    }

    /// Create an arbitrary file under the storage root.
    pub fn file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}

/// Sorted filenames in a directory.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
