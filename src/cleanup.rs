//! Removal of resized copies when their original is deleted.
//!
//! The host deletes the originals itself and hands over the identifiers it
//! deleted. For every identifier and every configured size this module
//! recomputes the sibling name (see [`naming`](crate::naming)) inside the
//! directory the user is browsing, and asks the [`FileStorage`] to delete it.
//!
//! ## Path safety
//!
//! A candidate is only deleted when its canonical path lies inside both the
//! canonical current directory and the canonical storage root. Containment is
//! checked component-wise on real paths, so `..` segments and symlinks that
//! lead elsewhere are rejected. A candidate that does not exist is simply
//! missing. Neither case is an error.
//!
//! ## Identifiers
//!
//! The host's media browser sends identifiers encoded with [`HostIdCodec`]:
//! standard base64 with `+`, `/` and `=` replaced by `:`, `_` and `-`.
//! Only the base name and extension of a decoded identifier are used.

use crate::naming::split_original;
use crate::sizes::SizeSpec;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("identifier is not valid base64: {0}")]
    Base64(String),
    #[error("identifier does not decode to UTF-8")]
    Utf8,
    #[error("identifier decodes to \"{0}\", which has no filename")]
    NoFileName(String),
}

/// Decodes the host's file identifiers into filenames.
pub trait IdCodec {
    fn decode(&self, id: &str) -> Result<String, CodecError>;
}

/// The host media browser's identifier encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostIdCodec;

/// Standard alphabet, padding optional on decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

impl HostIdCodec {
    pub fn encode(&self, name: &str) -> String {
        LENIENT
            .encode(name)
            .chars()
            .map(|c| match c {
                '+' => ':',
                '/' => '_',
                '=' => '-',
                other => other,
            })
            .collect()
    }
}

impl IdCodec for HostIdCodec {
    fn decode(&self, id: &str) -> Result<String, CodecError> {
        let standard: String = id
            .trim()
            .chars()
            .map(|c| match c {
                ':' => '+',
                '_' => '/',
                '-' => '=',
                other => other,
            })
            .collect();
        let bytes = LENIENT
            .decode(standard)
            .map_err(|e| CodecError::Base64(e.to_string()))?;
        String::from_utf8(bytes).map_err(|_| CodecError::Utf8)
    }
}

/// Identifiers that are already plain filenames.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainIdCodec;

impl IdCodec for PlainIdCodec {
    fn decode(&self, id: &str) -> Result<String, CodecError> {
        Ok(id.to_string())
    }
}

/// Storage collaborator that performs the actual deletion.
pub trait FileStorage {
    fn delete_file(&self, path: &Path) -> io::Result<()>;
}

/// Deletes from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl FileStorage for LocalStorage {
    fn delete_file(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Where the deletion happened, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteContext {
    /// Managed storage root; nothing outside it is ever deleted.
    pub storage_root: PathBuf,
    /// Directory the user is browsing; originals and copies live here.
    pub current_path: PathBuf,
}

/// Canonical roots a candidate must lie inside.
#[derive(Debug, Clone)]
struct SafeRoots {
    current: PathBuf,
    storage: PathBuf,
}

impl SafeRoots {
    fn resolve(ctx: &DeleteContext) -> io::Result<Self> {
        Ok(Self {
            current: ctx.current_path.canonicalize()?,
            storage: ctx.storage_root.canonicalize()?,
        })
    }

    fn contains(&self, canonical: &Path) -> bool {
        canonical.starts_with(&self.current) && canonical.starts_with(&self.storage)
    }
}

/// Outcome of the path-safety check for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exists and resolves inside both roots.
    Safe(PathBuf),
    /// Does not exist (or cannot be resolved).
    Missing,
    /// Resolves outside the current directory or the storage root.
    Escapes(PathBuf),
}

/// Resolve `candidate` and check it against both roots.
pub fn resolve_candidate(candidate: &Path, ctx: &DeleteContext) -> io::Result<Resolution> {
    let roots = SafeRoots::resolve(ctx)?;
    Ok(check_candidate(candidate, &roots))
}

fn check_candidate(candidate: &Path, roots: &SafeRoots) -> Resolution {
    match candidate.canonicalize() {
        Ok(real) if roots.contains(&real) => Resolution::Safe(real),
        Ok(real) => Resolution::Escapes(real),
        Err(_) => Resolution::Missing,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateStatus {
    Deleted,
    /// No copy exists for this size.
    Missing,
    /// The candidate resolved outside the allowed roots and was left alone.
    Rejected,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    /// Decoded original filename.
    pub original: String,
    pub key: String,
    pub path: PathBuf,
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanupReport {
    pub candidates: Vec<CandidateResult>,
    /// Identifiers that could not be decoded, with the reason.
    pub undecodable: Vec<(String, String)>,
    /// Set when the current path or storage root could not be resolved.
    pub roots_unavailable: Option<String>,
}

impl CleanupReport {
    pub fn deleted(&self) -> Vec<&Path> {
        self.candidates
            .iter()
            .filter(|c| c.status == CandidateStatus::Deleted)
            .map(|c| c.path.as_path())
            .collect()
    }

    pub fn count(&self, status: &CandidateStatus) -> usize {
        self.candidates.iter().filter(|c| &c.status == status).count()
    }
}

/// Delete resized copies of the given originals from the local filesystem.
pub fn cleanup(identifiers: &[String], sizes: &[SizeSpec], ctx: &DeleteContext) -> CleanupReport {
    cleanup_with(&HostIdCodec, &LocalStorage, identifiers, sizes, ctx)
}

/// Delete resized copies using explicit codec and storage collaborators.
pub fn cleanup_with(
    codec: &impl IdCodec,
    storage: &impl FileStorage,
    identifiers: &[String],
    sizes: &[SizeSpec],
    ctx: &DeleteContext,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    let roots = match SafeRoots::resolve(ctx) {
        Ok(roots) => roots,
        Err(e) => {
            warn!(
                current_path = %ctx.current_path.display(),
                storage_root = %ctx.storage_root.display(),
                error = %e,
                "cannot resolve cleanup roots, nothing deleted"
            );
            report.roots_unavailable = Some(e.to_string());
            return report;
        }
    };

    for id in identifiers {
        let decoded = codec.decode(id).and_then(|name| match split_original(Path::new(&name)) {
            Some(parts) => Ok((name, parts)),
            None => Err(CodecError::NoFileName(name)),
        });
        let (original, parts) = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(identifier = %id, error = %e, "cannot decode file identifier");
                report.undecodable.push((id.clone(), e.to_string()));
                continue;
            }
        };

        for size in sizes {
            // Joined to the raw current path, as the host will see it
            let candidate = ctx.current_path.join(parts.sibling(&size.key));

            let status = match check_candidate(&candidate, &roots) {
                Resolution::Missing => CandidateStatus::Missing,
                Resolution::Escapes(real) => {
                    debug!(
                        candidate = %candidate.display(),
                        resolved = %real.display(),
                        "candidate escapes storage roots, skipped"
                    );
                    CandidateStatus::Rejected
                }
                Resolution::Safe(_) => match storage.delete_file(&candidate) {
                    Ok(()) => {
                        info!(path = %candidate.display(), key = %size.key, "resized copy deleted");
                        CandidateStatus::Deleted
                    }
                    Err(e) => {
                        warn!(path = %candidate.display(), error = %e, "failed to delete resized copy");
                        CandidateStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                },
            };

            report.candidates.push(CandidateResult {
                original: original.clone(),
                key: size.key.clone(),
                path: candidate,
                status,
            });
        }
    }

    report
}
