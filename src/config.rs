//! Resize configuration.
//!
//! Handles loading, validating, and merging the `config.toml` file. Stock
//! defaults are the base layer; the user's file only needs the keys it
//! overrides.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [sizes]
//! # key = "WxH"; no sizes configured means nothing is resized
//!
//! [output]
//! keep_aspect_ratio = true  # fit within the box; false stretches to it
//! quality = 90              # JPEG quality (1-100)
//!
//! [storage]
//! root = "media/wysiwyg"    # managed storage root for cleanup
//! ```
//!
//! Unknown keys are rejected to catch typos early. Every size string is
//! parsed during validation, so a malformed size rejects the whole file.
//!
//! ## Fresh reads
//!
//! Handlers receive sizes through [`SizeSource`]. [`ConfigFile`] re-reads and
//! re-validates the file on every call; nothing is cached between events.

use crate::process::GenerateOptions;
use crate::sizes::{SizeError, SizeSpec, parse_sizes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid size: {0}")]
    Size(#[from] SizeError),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Size key → `"WxH"` string.
    pub sizes: BTreeMap<String, String>,
    /// Geometry and encoding of resized copies.
    pub output: OutputConfig,
    /// Storage layout.
    pub storage: StorageConfig,
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.storage.root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.root must not be empty".into(),
            ));
        }
        parse_sizes(&self.sizes)?;
        Ok(())
    }

    /// Parsed sizes, in key order.
    pub fn size_specs(&self) -> Result<Vec<SizeSpec>, ConfigError> {
        Ok(parse_sizes(&self.sizes)?)
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            keep_aspect_ratio: self.output.keep_aspect_ratio,
            quality: self.output.quality,
        }
    }

    pub fn storage_root(&self) -> PathBuf {
        PathBuf::from(&self.storage.root)
    }
}

/// Output settings for resized copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Preserve aspect ratio (fit within the box) or stretch to the box.
    pub keep_aspect_ratio: bool,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            keep_aspect_ratio: true,
            quality: 90,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Managed storage root; cleanup never deletes outside it.
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "media/wysiwyg".to_string(),
        }
    }
}

// =============================================================================
// Size sources
// =============================================================================

/// Supplies the configured sizes and options for one event.
pub trait SizeSource {
    fn load(&self) -> Result<ResizeConfig, ConfigError>;

    fn size_specs(&self) -> Result<Vec<SizeSpec>, ConfigError> {
        self.load()?.size_specs()
    }
}

/// An already-loaded configuration, injected by the host.
impl SizeSource for ResizeConfig {
    fn load(&self) -> Result<ResizeConfig, ConfigError> {
        self.validate()?;
        Ok(self.clone())
    }
}

/// A config file read from disk on every call.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SizeSource for ConfigFile {
    fn load(&self) -> Result<ResizeConfig, ConfigError> {
        load_config(&self.path)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ResizeConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# wysiwyg-resize Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Target sizes
# ---------------------------------------------------------------------------
# One resized copy per entry, written next to every uploaded image as
# <name>-<key>.<ext>. Values are "<width>x<height>" (a single space around
# the x is allowed). Images that already fit a box are not resized.
# Keys may contain letters, digits, '-' and '_'.
[sizes]
# small = "50x50"
# large = "800 x 600"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Fit within the box keeping the aspect ratio. Set to false to stretch
# copies to exactly the configured dimensions.
keep_aspect_ratio = true

# JPEG encoding quality (1 = worst, 100 = best). Other formats ignore it.
quality = 90

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Managed storage root. Cleanup never deletes anything outside it.
root = "media/wysiwyg"
"##
}
