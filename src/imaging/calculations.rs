//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::ResizeMode;

/// Whether `source` already fits inside `target` in both dimensions.
///
/// Such images are never resized: generating a copy would mean upscaling.
///
/// ```
/// # use wysiwyg_resize::imaging::fits_within;
/// assert!(fits_within((40, 40), (50, 50)));
/// assert!(fits_within((50, 50), (50, 50)));
/// assert!(!fits_within((51, 10), (50, 50)));
/// ```
pub fn fits_within(source: (u32, u32), target: (u32, u32)) -> bool {
    source.0 <= target.0 && source.1 <= target.1
}

/// Dimensions of `source` scaled to fit inside `target`, preserving aspect ratio.
///
/// The limiting side matches the box exactly; the other is scaled
/// proportionally and rounded, never below 1px.
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let ratio_w = tgt_w as f64 / src_w as f64;
    let ratio_h = tgt_h as f64 / src_h as f64;

    if ratio_w <= ratio_h {
        // Width is the limiting side
        let h = (src_h as f64 * ratio_w).round().max(1.0) as u32;
        (tgt_w, h.min(tgt_h))
    } else {
        // Height is the limiting side
        let w = (src_w as f64 * ratio_h).round().max(1.0) as u32;
        (w.min(tgt_w), tgt_h)
    }
}

/// Expected output dimensions for a resize in the given mode.
pub fn calculate_output_dimensions(
    source: (u32, u32),
    target: (u32, u32),
    mode: ResizeMode,
) -> (u32, u32) {
    match mode {
        ResizeMode::Fit => calculate_fit_dimensions(source, target),
        ResizeMode::Exact => target,
    }
}
