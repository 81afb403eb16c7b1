//! Sibling filename convention for resized copies.
//!
//! A resized copy lives next to its original and is named after it:
//!
//! ```text
//! photo.jpg  + small  →  photo-small.jpg
//! photo.jpg  + large  →  photo-large.jpg
//! README     + small  →  README-small
//! ```
//!
//! Nothing records which copies exist. Cleanup recomputes the same names from
//! the original's filename, so [`sibling_name`] is the only link between an
//! original and its resized copies and both sides must go through it.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Base name and extension of an original, as used by the convention.
///
/// Both parts are kept as `OsString` so names that are not valid UTF-8
/// survive unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalName {
    /// Filename without the final extension (`photo` for `photo.jpg`).
    pub base: OsString,
    /// Final extension without the dot, if any.
    pub extension: Option<OsString>,
}

impl OriginalName {
    /// Filename of the resized copy for the size `key`.
    pub fn sibling(&self, key: &str) -> OsString {
        let mut name = self.base.clone();
        name.push("-");
        name.push(key);
        if let Some(ext) = &self.extension {
            name.push(".");
            name.push(ext);
        }
        name
    }
}

/// Split the last path component into base name and extension.
///
/// Directory components are ignored. Returns `None` when the path has no
/// filename (empty, `/`, or ending in `..`).
pub fn split_original(path: &Path) -> Option<OriginalName> {
    let base = path.file_stem()?.to_os_string();
    let extension = path.extension().map(OsStr::to_os_string);
    Some(OriginalName { base, extension })
}

/// Filename of the resized copy of `original` for the size `key`.
pub fn sibling_name(original: &Path, key: &str) -> Option<OsString> {
    Some(split_original(original)?.sibling(key))
}

/// Full path of the resized copy, in the same directory as `source`.
pub fn sibling_path(source: &Path, key: &str) -> Option<PathBuf> {
    let name = sibling_name(source, key)?;
    Some(match source.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    })
}
