// ABOUTME: Errors that abort a batch upload.
// ABOUTME: Per-object failures are warnings, not errors, and never appear here.

use std::path::PathBuf;

use crate::files::GlobError;
use crate::provider::{ErrorReference, ProviderError, references};
use crate::substitution::SubstitutionError;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Account-level denial; no further targets are attempted.
    #[error("{}: permission denied uploading {key}: {source}", references::UPLOAD_ACCESS_DENIED)]
    AccessDenied { key: String, source: ProviderError },

    #[error("{}: file to upload not found: {}", references::UPLOAD_FILE_NOT_FOUND, .path.display())]
    FileNotFound { path: PathBuf },

    #[error("{}: no package was supplied for a package upload target", references::UPLOAD_FILE_NOT_FOUND)]
    NoPackage,

    #[error("{}: failed to upload {key}: {source}", references::UPLOAD_PROVIDER_ERROR)]
    Provider { key: String, source: ProviderError },

    #[error(transparent)]
    Substitution(#[from] SubstitutionError),

    #[error(transparent)]
    Glob(#[from] GlobError),
}

impl UploadError {
    pub fn reference(&self) -> Option<ErrorReference> {
        match self {
            UploadError::AccessDenied { .. } => Some(references::UPLOAD_ACCESS_DENIED),
            UploadError::FileNotFound { .. } | UploadError::NoPackage => {
                Some(references::UPLOAD_FILE_NOT_FOUND)
            }
            UploadError::Provider { .. } => Some(references::UPLOAD_PROVIDER_ERROR),
            UploadError::Substitution(_) | UploadError::Glob(_) => None,
        }
    }
}
