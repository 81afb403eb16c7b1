//! Resized-copy generation for an uploaded original.
//!
//! For each configured size, a copy that fits the size's box is written next
//! to the original:
//!
//! ```text
//! wysiwyg/
//! ├── photo.jpg           # 1000x1000 upload
//! ├── photo-small.jpg     # small = "50x50"   → 50x50
//! └── photo-large.jpg     # large = "800x600" → 600x600
//! ```
//!
//! ## Rules
//!
//! - A missing or unreadable source is a no-op, reported as
//!   [`GenerateOutcome::SourceUnavailable`].
//! - A size whose box the original already fits in both dimensions is
//!   skipped. Copies are never upscaled.
//! - Existing copies are overwritten.
//! - Each size is independent: a failure is recorded for that size, logged,
//!   and the remaining sizes are still attempted.
//!
//! Nothing here returns an error. The caller's upload succeeds or fails on
//! its own; the [`GenerateReport`] is for logs and CLI output.

use crate::imaging::{
    ImageBackend, Quality, ResizeMode, ResizeOptions, ResizedCopy, RustBackend,
    create_resized_copy,
};
use crate::sizes::SizeSpec;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Fit within the box when true, stretch to the box when false.
    pub keep_aspect_ratio: bool,
    /// JPEG quality (1-100); ignored by lossless formats.
    pub quality: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            keep_aspect_ratio: true,
            quality: Quality::default().value(),
        }
    }
}

impl GenerateOptions {
    fn resize_options(&self) -> ResizeOptions {
        ResizeOptions {
            mode: ResizeMode::from_keep_aspect_ratio(self.keep_aspect_ratio),
            quality: Quality::new(self.quality),
        }
    }
}

/// Per-size result.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeStatus {
    /// A resized copy was written.
    Written {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// The original already fits the box.
    SkippedSmaller { width: u32, height: u32 },
    /// Resizing this size failed; other sizes were unaffected.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeResult {
    pub key: String,
    pub status: SizeStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// Source missing, not a regular file, or not readable.
    SourceUnavailable { reason: String },
    /// Every configured size was attempted, in order.
    Processed(Vec<SizeResult>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub source: PathBuf,
    pub outcome: GenerateOutcome,
}

impl GenerateReport {
    pub fn results(&self) -> &[SizeResult] {
        match &self.outcome {
            GenerateOutcome::Processed(results) => results,
            GenerateOutcome::SourceUnavailable { .. } => &[],
        }
    }

    /// Paths of all copies written.
    pub fn written(&self) -> Vec<&Path> {
        self.results()
            .iter()
            .filter_map(|r| match &r.status {
                SizeStatus::Written { path, .. } => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.results()
            .iter()
            .filter(|r| matches!(r.status, SizeStatus::Failed { .. }))
            .count()
    }
}

/// Check that `source` is an existing, readable regular file.
fn check_source(source: &Path) -> Result<(), String> {
    let meta = std::fs::metadata(source).map_err(|e| format!("not found: {e}"))?;
    if !meta.is_file() {
        return Err("not a regular file".to_string());
    }
    File::open(source).map_err(|e| format!("not readable: {e}"))?;
    Ok(())
}

/// Generate resized copies of `source` with the pure Rust backend.
pub fn generate(source: &Path, sizes: &[SizeSpec], options: &GenerateOptions) -> GenerateReport {
    generate_with_backend(&RustBackend::new(), source, sizes, options)
}

/// Generate resized copies using a specific backend (allows testing with mock).
pub fn generate_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    sizes: &[SizeSpec],
    options: &GenerateOptions,
) -> GenerateReport {
    if let Err(reason) = check_source(source) {
        debug!(source = %source.display(), %reason, "source unavailable, nothing to resize");
        return GenerateReport {
            source: source.to_path_buf(),
            outcome: GenerateOutcome::SourceUnavailable { reason },
        };
    }

    let resize_options = options.resize_options();
    let results = sizes
        .iter()
        .map(|size| {
            let status = match create_resized_copy(backend, source, size, &resize_options) {
                Ok(ResizedCopy::Written {
                    path,
                    width,
                    height,
                }) => {
                    info!(
                        source = %source.display(),
                        key = %size.key,
                        path = %path.display(),
                        width,
                        height,
                        "resized copy written"
                    );
                    SizeStatus::Written {
                        path,
                        width,
                        height,
                    }
                }
                Ok(ResizedCopy::AlreadyFits { width, height }) => {
                    debug!(
                        source = %source.display(),
                        key = %size.key,
                        "source {}x{} fits {}x{}, skipped",
                        width,
                        height,
                        size.width,
                        size.height
                    );
                    SizeStatus::SkippedSmaller { width, height }
                }
                Err(e) => {
                    warn!(
                        source = %source.display(),
                        key = %size.key,
                        error = %e,
                        "failed to create resized copy"
                    );
                    SizeStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            SizeResult {
                key: size.key.clone(),
                status,
            }
        })
        .collect();

    GenerateReport {
        source: source.to_path_buf(),
        outcome: GenerateOutcome::Processed(results),
    }
}
