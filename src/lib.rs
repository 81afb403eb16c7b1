//! # wysiwyg-resize
//!
//! Resized copies for a CMS wysiwyg image library. When an image is
//! uploaded, one copy per configured size is written next to it; when the
//! original is deleted, those copies are deleted too.
//!
//! # Two Event Flows
//!
//! ```text
//! upload   {"error":false,"path":…,"file":…}  →  process::generate  →  photo-small.jpg, photo-large.jpg
//! delete   files=["cGhvdG8uanBn"]             →  cleanup::cleanup   →  photo-small.jpg, photo-large.jpg removed
//! ```
//!
//! The host owns both events. It calls the adapters in [`events`] and the
//! outcome of its own upload or delete never depends on what happens here:
//! both operations return reports, not errors.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sizes`] | `"WxH"` parsing into [`sizes::SizeSpec`], size key validation |
//! | [`naming`] | The `{base}-{key}.{ext}` sibling naming convention |
//! | [`imaging`] | Image backend: identify, fit-within resize, format-preserving encode |
//! | [`process`] | Resized-copy generation for one original |
//! | [`cleanup`] | Sibling deletion with the path-safety check |
//! | [`events`] | Upload/delete payload decoding and the [`events::ResizeObserver`] |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Naming Is the Only Link
//!
//! No manifest records which copies exist. Cleanup recomputes the sibling
//! names from the original's name and the current sizes. A size removed from
//! the config, or an original renamed by hand, leaves its copies behind.
//!
//! ## Never Upscale
//!
//! A size is skipped when the original already fits its box in both
//! dimensions. Small uploads therefore have fewer siblings than large ones,
//! and cleanup treats an absent sibling as nothing to do.
//!
//! ## Canonical Containment
//!
//! Deletion candidates come from user-controlled identifiers. A candidate is
//! deleted only when its canonical path is inside both the canonical current
//! directory and the canonical storage root. Size keys are restricted to
//! `[A-Za-z0-9_-]` so they cannot smuggle separators into a filename.
//!
//! ## Fresh Configuration
//!
//! Sizes are read through [`config::SizeSource`] on every event.
//! [`config::ConfigFile`] re-reads the file each time, so edits apply to the
//! next upload without a restart.

pub mod cleanup;
pub mod config;
pub mod events;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod sizes;

#[cfg(test)]
pub(crate) mod test_helpers;
