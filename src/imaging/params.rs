//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! [`operations`](super::operations), which decides whether and where a
//! resized copy is written, and the [`backend`](super::backend), which does
//! the pixel work. Tests swap in a recording backend without touching the
//! operation logic.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// How the source is mapped onto the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Scale so the whole image fits inside the box, preserving aspect ratio.
    #[default]
    Fit,
    /// Stretch to exactly the box dimensions.
    Exact,
}

impl ResizeMode {
    pub fn from_keep_aspect_ratio(keep: bool) -> Self {
        if keep { Self::Fit } else { Self::Exact }
    }
}

/// Parameters for a single resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Target box.
    pub width: u32,
    pub height: u32,
    pub mode: ResizeMode,
    pub quality: Quality,
}
