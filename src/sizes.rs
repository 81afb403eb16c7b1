//! Configured target sizes.
//!
//! Sizes are configured as a mapping from a short key to a `"WxH"` string:
//!
//! ```text
//! small = "50x50"
//! large = "800 x 600"
//! ```
//!
//! The key doubles as the filename suffix of every resized copy
//! (`photo.jpg` → `photo-small.jpg`), so it is restricted to
//! `[A-Za-z0-9_-]`. The separator is a single `x`, optionally surrounded by
//! one space on either side.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SizeError {
    #[error("size '{key}': expected \"<width>x<height>\", got \"{value}\"")]
    Malformed { key: String, value: String },
    #[error("size '{key}': width and height must be positive, got \"{value}\"")]
    ZeroDimension { key: String, value: String },
    #[error("invalid size key \"{0}\": only letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),
}

/// A single target box, identified by its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSpec {
    /// Identifier and filename suffix (e.g. `small`).
    pub key: String,
    pub width: u32,
    pub height: u32,
}

impl SizeSpec {
    pub fn new(key: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            key: key.into(),
            width,
            height,
        }
    }
}

/// Parse a `"WxH"` value.
///
/// Accepts `"800x600"`, `"800 x600"`, `"800x 600"` and `"800 x 600"`.
/// Anything else (missing height, extra separators, non-numeric parts,
/// zero dimensions) is an error.
pub fn parse_size(key: &str, value: &str) -> Result<(u32, u32), SizeError> {
    let malformed = || SizeError::Malformed {
        key: key.to_string(),
        value: value.to_string(),
    };

    let (w, h) = value.split_once('x').ok_or_else(malformed)?;
    let w = w.strip_suffix(' ').unwrap_or(w);
    let h = h.strip_prefix(' ').unwrap_or(h);

    if !is_digits(w) || !is_digits(h) {
        return Err(malformed());
    }
    let width: u32 = w.parse().map_err(|_| malformed())?;
    let height: u32 = h.parse().map_err(|_| malformed())?;

    if width == 0 || height == 0 {
        return Err(SizeError::ZeroDimension {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok((width, height))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check that a key is safe to embed in a filename.
pub fn validate_key(key: &str) -> Result<(), SizeError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(SizeError::InvalidKey(key.to_string()))
    }
}

/// Parse every configured entry into a [`SizeSpec`], in key order.
///
/// Fails on the first malformed entry.
pub fn parse_sizes(config: &BTreeMap<String, String>) -> Result<Vec<SizeSpec>, SizeError> {
    config
        .iter()
        .map(|(key, value)| {
            validate_key(key)?;
            let (width, height) = parse_size(key, value)?;
            Ok(SizeSpec::new(key.clone(), width, height))
        })
        .collect()
}
