//! Adapters between the host's upload/delete events and the core operations.
//!
//! The host owns dispatch. It calls [`ResizeObserver::on_upload_complete`]
//! after an upload finished and [`ResizeObserver::on_files_deleted`] after it
//! removed originals. The `handle_*` variants take the raw payloads the host
//! receives (the upload response body and the `files` request parameter).
//!
//! Every call reads the size configuration afresh through its
//! [`SizeSource`]. Nothing here ever fails the host's own operation:
//! problems are logged and reported back as `None` or `Err` for the host to
//! inspect if it wants to.
//!
//! The upload response's `error` field is read loosely: the host sends
//! `false` or `0` on success and an error code or message on failure.

use crate::cleanup::{
    CleanupReport, DeleteContext, FileStorage, HostIdCodec, IdCodec, LocalStorage, cleanup_with,
};
use crate::config::{ConfigError, SizeSource};
use crate::imaging::{ImageBackend, RustBackend};
use crate::process::{GenerateReport, generate_with_backend};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum EventError {
    #[error("malformed event payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("size configuration unavailable: {0}")]
    Config(#[from] ConfigError),
}

/// Outcome of an upload, as returned by the host's upload handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadResult {
    /// Whether the host reported a failed upload.
    #[serde(deserialize_with = "deserialize_flag")]
    pub error: bool,
    /// Directory the file was saved to.
    pub path: String,
    /// Saved filename.
    pub file: String,
}

/// `false`, `0`, `""`, `"0"`, `null` and empty containers are false.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    })
}

impl UploadResult {
    pub fn from_response_body(body: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Full path of the saved original.
    pub fn source_path(&self) -> PathBuf {
        PathBuf::from(&self.path).join(&self.file)
    }
}

/// Decode the `files` request parameter: a JSON array of encoded identifiers.
pub fn decode_files_param(param: &str) -> Result<Vec<String>, EventError> {
    Ok(serde_json::from_str(param)?)
}

/// Host-facing entry points, wired to the size source and collaborators.
pub struct ResizeObserver<S, B = RustBackend, F = LocalStorage, C = HostIdCodec> {
    sizes: S,
    backend: B,
    storage: F,
    codec: C,
}

impl<S: SizeSource> ResizeObserver<S> {
    /// Observer using the image crate, the local filesystem and host identifiers.
    pub fn new(sizes: S) -> Self {
        Self {
            sizes,
            backend: RustBackend::new(),
            storage: LocalStorage,
            codec: HostIdCodec,
        }
    }
}

impl<S, B, F, C> ResizeObserver<S, B, F, C>
where
    S: SizeSource,
    B: ImageBackend,
    F: FileStorage,
    C: IdCodec,
{
    pub fn with_parts(sizes: S, backend: B, storage: F, codec: C) -> Self {
        Self {
            sizes,
            backend,
            storage,
            codec,
        }
    }

    /// Swap the identifier codec, e.g. for hosts that send plain names.
    pub fn with_codec<C2: IdCodec>(self, codec: C2) -> ResizeObserver<S, B, F, C2> {
        ResizeObserver {
            sizes: self.sizes,
            backend: self.backend,
            storage: self.storage,
            codec,
        }
    }

    fn upload(&self, result: &UploadResult) -> Result<Option<GenerateReport>, ConfigError> {
        if result.error {
            debug!(file = %result.file, "upload reported an error, nothing to resize");
            return Ok(None);
        }
        let config = self.sizes.load()?;
        let sizes = config.size_specs()?;
        Ok(Some(generate_with_backend(
            &self.backend,
            &result.source_path(),
            &sizes,
            &config.generate_options(),
        )))
    }

    fn delete(
        &self,
        identifiers: &[String],
        ctx: &DeleteContext,
    ) -> Result<CleanupReport, ConfigError> {
        let sizes = self.sizes.size_specs()?;
        Ok(cleanup_with(
            &self.codec,
            &self.storage,
            identifiers,
            &sizes,
            ctx,
        ))
    }

    /// Generate resized copies for a finished upload.
    ///
    /// Returns `None` when the upload failed or the configuration is unreadable.
    pub fn on_upload_complete(&self, result: &UploadResult) -> Option<GenerateReport> {
        self.upload(result)
            .inspect_err(|e| warn!(error = %e, "cannot read size configuration"))
            .ok()
            .flatten()
    }

    /// Delete resized copies of originals the host just deleted.
    ///
    /// Returns `None` when the configuration is unreadable.
    pub fn on_files_deleted(
        &self,
        identifiers: &[String],
        ctx: &DeleteContext,
    ) -> Option<CleanupReport> {
        self.delete(identifiers, ctx)
            .inspect_err(|e| warn!(error = %e, "cannot read size configuration"))
            .ok()
    }

    /// Decode an upload response body and generate resized copies.
    ///
    /// `Ok(None)` means the host reported a failed upload.
    pub fn handle_upload_response(&self, body: &str) -> Result<Option<GenerateReport>, EventError> {
        let result = UploadResult::from_response_body(body).inspect_err(|e| {
            warn!(error = %e, "cannot decode upload response");
        })?;
        Ok(self.upload(&result).inspect_err(|e| {
            warn!(error = %e, "cannot read size configuration");
        })?)
    }

    /// Decode a `files` parameter and delete the resized copies.
    pub fn handle_delete_request(
        &self,
        files: &str,
        ctx: &DeleteContext,
    ) -> Result<CleanupReport, EventError> {
        let identifiers = decode_files_param(files).inspect_err(|e| {
            warn!(error = %e, "cannot decode files parameter");
        })?;
        Ok(self.delete(&identifiers, ctx).inspect_err(|e| {
            warn!(error = %e, "cannot read size configuration");
        })?)
    }
}
