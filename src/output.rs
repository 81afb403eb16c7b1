//! CLI output formatting for resize and cleanup reports.
//!
//! Output is organised by original: a header line naming the original file,
//! then one indented line per configured size.
//!
//! ## Resize
//!
//! ```text
//! photo.jpg
//!     small: 50x50 → photo-small.jpg
//!     large: 600x600 → photo-large.jpg
//!     huge: skipped, 1000x1000 already fits
//! Wrote 2 copies, 1 skipped, 0 failed
//! ```
//!
//! ## Cleanup
//!
//! ```text
//! photo.jpg
//!     small: deleted photo-small.jpg
//!     large: not present
//! Undecodable
//!     !!!: identifier is not valid base64: ...
//! Deleted 1 copy
//! ```
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::cleanup::{CandidateStatus, CleanupReport};
use crate::process::{GenerateOutcome, GenerateReport, SizeStatus};
use crate::sizes::SizeSpec;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn copies(n: usize) -> String {
    if n == 1 {
        "1 copy".to_string()
    } else {
        format!("{n} copies")
    }
}

// ============================================================================
// Resize
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    let results = match &report.outcome {
        GenerateOutcome::SourceUnavailable { reason } => {
            lines.push(format!(
                "{}: source unavailable ({reason})",
                report.source.display()
            ));
            return lines;
        }
        GenerateOutcome::Processed(results) => results,
    };

    lines.push(file_name(&report.source));
    let (mut written, mut skipped, mut failed) = (0, 0, 0);
    for result in results {
        let detail = match &result.status {
            SizeStatus::Written {
                path,
                width,
                height,
            } => {
                written += 1;
                format!("{width}x{height} → {}", file_name(path))
            }
            SizeStatus::SkippedSmaller { width, height } => {
                skipped += 1;
                format!("skipped, {width}x{height} already fits")
            }
            SizeStatus::Failed { error } => {
                failed += 1;
                format!("failed: {error}")
            }
        };
        lines.push(format!("{}{}: {}", indent(1), result.key, detail));
    }
    lines.push(format!(
        "Wrote {}, {skipped} skipped, {failed} failed",
        copies(written)
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Cleanup
// ============================================================================

pub fn format_cleanup_output(report: &CleanupReport) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(reason) = &report.roots_unavailable {
        lines.push(format!("Storage roots unavailable ({reason}), nothing deleted"));
        return lines;
    }

    let mut current: Option<&str> = None;
    for candidate in &report.candidates {
        if current != Some(candidate.original.as_str()) {
            lines.push(candidate.original.clone());
            current = Some(candidate.original.as_str());
        }
        let detail = match &candidate.status {
            CandidateStatus::Deleted => format!("deleted {}", file_name(&candidate.path)),
            CandidateStatus::Missing => "not present".to_string(),
            CandidateStatus::Rejected => "rejected, outside storage root".to_string(),
            CandidateStatus::Failed { error } => format!("failed: {error}"),
        };
        lines.push(format!("{}{}: {}", indent(1), candidate.key, detail));
    }

    if !report.undecodable.is_empty() {
        lines.push("Undecodable".to_string());
        for (id, error) in &report.undecodable {
            lines.push(format!("{}{id}: {error}", indent(1)));
        }
    }

    lines.push(format!(
        "Deleted {}",
        copies(report.count(&CandidateStatus::Deleted))
    ));
    lines
}

pub fn print_cleanup_output(report: &CleanupReport) {
    for line in format_cleanup_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Sizes
// ============================================================================

/// One line per configured size, keys aligned.
pub fn format_sizes_output(sizes: &[SizeSpec]) -> Vec<String> {
    if sizes.is_empty() {
        return vec!["No sizes configured".to_string()];
    }
    let width = sizes.iter().map(|s| s.key.len()).max().unwrap_or(0);
    sizes
        .iter()
        .map(|s| format!("{:<width$}  {}x{}", s.key, s.width, s.height))
        .collect()
}

pub fn print_sizes_output(sizes: &[SizeSpec]) {
    for line in format_sizes_output(sizes) {
        println!("{}", line);
    }
}
