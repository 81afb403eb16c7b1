//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, WebP, TIFF, BMP) | `image::ImageReader` with content sniffing |
//! | Resize (keep aspect) | `DynamicImage::resize` with `Lanczos3` |
//! | Resize (exact) | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode others | `DynamicImage::write_to` in the output's format |
//!
//! The output format always follows the output path's extension, which is the
//! original's extension, so a resized copy keeps its original's format.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{ResizeMode, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::{File, Permissions};
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;

/// Extensions whose codecs are compiled in, for both decode and encode.
const FORMAT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("bmp", ImageFormat::Bmp),
];

/// Map a path's extension to an output format, case-insensitively.
fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    FORMAT_CANDIDATES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| {
            BackendError::UnsupportedFormat(if ext.is_empty() {
                format!("{} has no extension", path.display())
            } else {
                ext
            })
        })
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<File>>, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Load and decode an image from disk, sniffing the format from its content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?.decode().map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })
}

type TempWriter = BufWriter<NamedTempFile>;

/// Write `path` through a temporary file in the same directory.
///
/// The target is only replaced once `write` succeeded and the data is
/// flushed; on failure the temporary file is removed and an existing copy
/// stays intact.
fn write_atomically(
    path: &Path,
    permissions: Permissions,
    write: impl FnOnce(&mut TempWriter) -> Result<(), BackendError>,
) -> Result<(), BackendError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".resize-")
        .tempfile_in(dir)?;
    let mut writer = BufWriter::new(tmp);
    write(&mut writer)?;

    let tmp = writer
        .into_inner()
        .map_err(|e| BackendError::Io(e.into_error()))?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

/// Encode `img` to `path` in the format implied by its extension.
///
/// The copy gets `permissions`, normally those of its original.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    quality: u32,
    permissions: Permissions,
) -> Result<(), BackendError> {
    let format = output_format(path)?;
    write_atomically(path, permissions, |writer| {
        let encoded = match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality as u8))
            }
            other => img.write_to(writer, other),
        };
        encoded.map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
        })
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        // Reject unwritable formats before paying for the decode
        output_format(&params.output)?;

        let permissions = std::fs::metadata(&params.source)?.permissions();
        let img = load_image(&params.source)?;
        let resized = match params.mode {
            ResizeMode::Fit => img.resize(params.width, params.height, FilterType::Lanczos3),
            ResizeMode::Exact => {
                img.resize_exact(params.width, params.height, FilterType::Lanczos3)
            }
        };
        save_image(&resized, &params.output, params.quality.value(), permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::naming::sibling_path;
    use crate::test_helpers::{create_test_jpeg, create_test_png, list_files};
    use image::RgbaImage;
    use std::io::Write;

    fn params(source: &Path, output: &Path, width: u32, height: u32) -> ResizeParams {
        ResizeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            width,
            height,
            mode: ResizeMode::Fit,
            quality: Quality::new(85),
        }
    }

    #[test]
    fn output_format_is_case_insensitive() {
        assert_eq!(output_format(Path::new("a.JPG")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(output_format(Path::new("a.Png")).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn output_format_rejects_unknown() {
        assert!(matches!(
            output_format(Path::new("a.psd")),
            Err(BackendError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            output_format(Path::new("noext")),
            Err(BackendError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn identify_sniffs_content_over_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        // PNG bytes behind a .jpg name
        let path = tmp.path().join("mislabelled.jpg");
        create_test_png(&path, 30, 20);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions { width: 30, height: 20 });
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn resize_jpeg_fits_box() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("source-small.jpg");
        RustBackend::new()
            .resize(&params(&source, &output, 100, 100))
            .unwrap();

        let (w, h) = image::image_dimensions(&output).unwrap();
        assert_eq!((w, h), (100, 75));
    }

    #[test]
    fn resize_exact_stretches() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_png(&source, 400, 300);

        let output = tmp.path().join("source-sq.png");
        let mut p = params(&source, &output, 100, 100);
        p.mode = ResizeMode::Exact;
        RustBackend::new().resize(&p).unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (100, 100));
    }

    #[test]
    fn resize_preserves_png_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("logo.png");
        create_test_png(&source, 64, 64);

        let output = tmp.path().join("logo-small.png");
        RustBackend::new()
            .resize(&params(&source, &output, 32, 32))
            .unwrap();

        let format = ImageReader::open(&output)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(ImageFormat::Png));
    }

    #[test]
    fn resize_rgba_png_source_to_jpeg_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("alpha.png");
        create_test_png(&source, 50, 50);

        let output = tmp.path().join("alpha-small.jpg");
        RustBackend::new()
            .resize(&params(&source, &output, 20, 20))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (20, 20));
    }

    #[test]
    fn resize_corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not a jpeg").unwrap();

        let output = tmp.path().join("broken-small.jpg");
        let result = RustBackend::new().resize(&params(&source, &output, 10, 10));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn resize_unsupported_output_errors_without_writing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 100, 100);

        let output = tmp.path().join("source-small.psd");
        let result = RustBackend::new().resize(&params(&source, &output, 50, 50));
        assert!(matches!(result, Err(BackendError::UnsupportedFormat(_))));
        assert!(!output.exists());
    }

    #[test]
    fn resize_overwrites_existing_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 200, 200);

        let output = tmp.path().join("source-small.jpg");
        std::fs::write(&output, b"stale").unwrap();
        RustBackend::new()
            .resize(&params(&source, &output, 50, 50))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (50, 50));
    }

    #[test]
    fn resize_preserves_every_library_format() {
        let cases = [
            ("gif", ImageFormat::Gif),
            ("webp", ImageFormat::WebP),
            ("tif", ImageFormat::Tiff),
            ("tiff", ImageFormat::Tiff),
            ("bmp", ImageFormat::Bmp),
            ("png", ImageFormat::Png),
            ("jpeg", ImageFormat::Jpeg),
        ];

        for (ext, format) in cases {
            let tmp = tempfile::TempDir::new().unwrap();
            let source = tmp.path().join(format!("photo.{ext}"));
            let img = RgbaImage::from_fn(200, 100, |x, y| {
                image::Rgba([(x % 256) as u8, (y % 256) as u8, 40, 255])
            });
            let img = match format {
                ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
                _ => DynamicImage::ImageRgba8(img),
            };
            img.save_with_format(&source, format).unwrap();

            let output = sibling_path(&source, "small").unwrap();
            RustBackend::new()
                .resize(&params(&source, &output, 40, 40))
                .unwrap_or_else(|e| panic!("{ext}: {e}"));

            let reader = ImageReader::open(&output)
                .unwrap()
                .with_guessed_format()
                .unwrap();
            assert_eq!(reader.format(), Some(format), "{ext}");
            assert_eq!(reader.into_dimensions().unwrap(), (40, 20), "{ext}");
            assert_eq!(
                list_files(tmp.path()),
                vec![format!("photo-small.{ext}"), format!("photo.{ext}")],
                "{ext}: no temporary files left"
            );
        }
    }

    #[test]
    fn failed_write_keeps_existing_copy() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("photo-small.jpg");
        std::fs::write(&output, b"good copy").unwrap();
        let permissions = std::fs::metadata(&output).unwrap().permissions();

        let result = write_atomically(&output, permissions, |writer| {
            writer.write_all(b"half an ima").unwrap();
            Err(BackendError::ProcessingFailed("disk full".into()))
        });

        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert_eq!(std::fs::read(&output).unwrap(), b"good copy");
        assert_eq!(list_files(tmp.path()), vec!["photo-small.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn copy_takes_permissions_of_original() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.png");
        create_test_png(&source, 100, 100);
        std::fs::set_permissions(&source, Permissions::from_mode(0o644)).unwrap();

        let output = tmp.path().join("photo-small.png");
        RustBackend::new()
            .resize(&params(&source, &output, 50, 50))
            .unwrap();

        let mode = std::fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
