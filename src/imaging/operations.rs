//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a target size, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_output_dimensions, fits_within};
use super::params::{Quality, ResizeMode, ResizeParams};
use crate::naming::sibling_path;
use crate::sizes::SizeSpec;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Encoding and geometry settings shared by every size of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    pub mode: ResizeMode,
    pub quality: Quality,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            mode: ResizeMode::Fit,
            quality: Quality::default(),
        }
    }
}

/// What happened for one size.
#[derive(Debug, Clone, PartialEq)]
pub enum ResizedCopy {
    /// A copy was written at `path` with the expected output dimensions.
    Written {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// The source already fits the box; nothing written.
    AlreadyFits { width: u32, height: u32 },
}

/// Plan a resize without executing it.
///
/// Returns `None` when the source already fits inside the target box, or
/// when `source` has no filename to derive a sibling name from.
pub fn plan_resize(
    source: &Path,
    original_dims: (u32, u32),
    size: &SizeSpec,
    options: &ResizeOptions,
) -> Option<ResizeParams> {
    if fits_within(original_dims, (size.width, size.height)) {
        return None;
    }
    Some(ResizeParams {
        source: source.to_path_buf(),
        output: sibling_path(source, &size.key)?,
        width: size.width,
        height: size.height,
        mode: options.mode,
        quality: options.quality,
    })
}

/// Create the resized sibling of `source` for one size.
///
/// The source is identified afresh, so a decode problem surfaces here as an
/// error for this size only.
pub fn create_resized_copy(
    backend: &impl ImageBackend,
    source: &Path,
    size: &SizeSpec,
    options: &ResizeOptions,
) -> Result<ResizedCopy> {
    let original_dims = get_dimensions(backend, source)?;

    let Some(params) = plan_resize(source, original_dims, size, options) else {
        if fits_within(original_dims, (size.width, size.height)) {
            return Ok(ResizedCopy::AlreadyFits {
                width: original_dims.0,
                height: original_dims.1,
            });
        }
        return Err(BackendError::ProcessingFailed(format!(
            "Cannot derive a resized filename from {}",
            source.display()
        )));
    };

    backend.resize(&params)?;

    let (width, height) =
        calculate_output_dimensions(original_dims, (size.width, size.height), options.mode);
    Ok(ResizedCopy::Written {
        path: params.output,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(1920, 1080);
        let dims = get_dimensions(&backend, Path::new("/test.jpg")).unwrap();
        assert_eq!(dims, (1920, 1080));
    }

    #[test]
    fn plan_skips_when_source_fits() {
        let size = SizeSpec::new("small", 50, 50);
        let plan = plan_resize(
            Path::new("/m/photo.jpg"),
            (40, 40),
            &size,
            &ResizeOptions::default(),
        );
        assert_eq!(plan, None);
    }

    #[test]
    fn plan_targets_sibling_path() {
        let size = SizeSpec::new("large", 800, 600);
        let plan = plan_resize(
            Path::new("/m/photo.jpg"),
            (1000, 1000),
            &size,
            &ResizeOptions::default(),
        )
        .unwrap();
        assert_eq!(plan.output, PathBuf::from("/m/photo-large.jpg"));
        assert_eq!((plan.width, plan.height), (800, 600));
        assert_eq!(plan.mode, ResizeMode::Fit);
    }

    #[test]
    fn plan_resizes_when_one_dimension_exceeds() {
        let size = SizeSpec::new("wide", 800, 600);
        assert!(
            plan_resize(
                Path::new("/m/p.png"),
                (100, 601),
                &size,
                &ResizeOptions::default()
            )
            .is_some()
        );
    }

    #[test]
    fn create_resized_copy_writes_and_reports_dimensions() {
        let backend = MockBackend::with_dimensions(1000, 1000);
        let size = SizeSpec::new("large", 800, 600);

        let result = create_resized_copy(
            &backend,
            Path::new("/m/photo.jpg"),
            &size,
            &ResizeOptions::default(),
        )
        .unwrap();

        assert_eq!(
            result,
            ResizedCopy::Written {
                path: PathBuf::from("/m/photo-large.jpg"),
                width: 600,
                height: 600,
            }
        );
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Identify(_)));
        assert!(matches!(&ops[1], RecordedOp::Resize { width: 800, height: 600, .. }));
    }

    #[test]
    fn create_resized_copy_never_upscales() {
        let backend = MockBackend::with_dimensions(40, 40);
        let size = SizeSpec::new("small", 50, 50);

        let result = create_resized_copy(
            &backend,
            Path::new("/m/photo.jpg"),
            &size,
            &ResizeOptions::default(),
        )
        .unwrap();

        assert_eq!(result, ResizedCopy::AlreadyFits { width: 40, height: 40 });
        assert!(backend.resize_outputs().is_empty());
    }

    #[test]
    fn create_resized_copy_exact_mode_reports_box() {
        let backend = MockBackend::with_dimensions(1000, 2000);
        let size = SizeSpec::new("sq", 100, 100);
        let options = ResizeOptions {
            mode: ResizeMode::Exact,
            ..ResizeOptions::default()
        };

        let result =
            create_resized_copy(&backend, Path::new("/m/p.jpg"), &size, &options).unwrap();
        assert!(matches!(
            result,
            ResizedCopy::Written { width: 100, height: 100, .. }
        ));
    }

    #[test]
    fn create_resized_copy_propagates_identify_error() {
        let backend = MockBackend::new();
        let size = SizeSpec::new("small", 50, 50);
        let result = create_resized_copy(
            &backend,
            Path::new("/m/photo.jpg"),
            &size,
            &ResizeOptions::default(),
        );
        assert!(result.is_err());
    }
}
