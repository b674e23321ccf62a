// ABOUTME: Error types for conventions and the pipeline that runs them.
// ABOUTME: Pipeline errors use SNAFU and name the convention that failed.

use snafu::Snafu;

use crate::files::GlobError;
use crate::provider::{ErrorReference, ProviderError};
use crate::stack::StackError;
use crate::substitution::SubstitutionError;
use crate::upload::UploadError;

/// Failure raised by a single convention.
#[derive(Debug, thiserror::Error)]
pub enum ConventionError {
    #[error(transparent)]
    Stack(#[from] StackError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Substitution(#[from] SubstitutionError),

    #[error(transparent)]
    Glob(#[from] GlobError),

    /// A provider client could not be built.
    #[error("failed to create provider client: {0}")]
    Client(#[from] ProviderError),

    #[error("{0}")]
    Invalid(String),
}

impl ConventionError {
    pub fn reference(&self) -> Option<ErrorReference> {
        match self {
            ConventionError::Stack(e) => e.reference(),
            ConventionError::Upload(e) => e.reference(),
            _ => None,
        }
    }
}

/// Pipeline failure: the first convention that failed, and why.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    #[snafu(display("{name} failed: {source}"))]
    Convention {
        name: String,
        source: ConventionError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// The provider refused an operation the deployment needs.
    PermissionDenied,
    /// A stack settled in a failure or rollback status.
    StackFailed,
    /// A stack wait passed its deadline.
    TimedOut,
    /// A required stack or local file is missing.
    NotFound,
    /// Any other provider failure.
    Provider,
    /// Local files, patterns, or settings were unusable.
    Invalid,
}

impl PipelineError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> PipelineErrorKind {
        let PipelineError::Convention { source, .. } = self;
        match source {
            ConventionError::Stack(e) => match e {
                StackError::AccessDenied { .. } => PipelineErrorKind::PermissionDenied,
                StackError::Failed { .. } => PipelineErrorKind::StackFailed,
                StackError::WaitTimedOut { .. } => PipelineErrorKind::TimedOut,
                StackError::Missing { .. } => PipelineErrorKind::NotFound,
                StackError::Provider { .. } => PipelineErrorKind::Provider,
                StackError::Unreadable { .. }
                | StackError::MissingTemplate { .. }
                | StackError::InvalidParameters { .. }
                | StackError::InvalidName { .. } => PipelineErrorKind::Invalid,
            },
            ConventionError::Upload(e) => match e {
                UploadError::AccessDenied { .. } => PipelineErrorKind::PermissionDenied,
                UploadError::FileNotFound { .. } | UploadError::NoPackage => {
                    PipelineErrorKind::NotFound
                }
                UploadError::Provider { .. } => PipelineErrorKind::Provider,
                UploadError::Substitution(_) | UploadError::Glob(_) => PipelineErrorKind::Invalid,
            },
            ConventionError::Client(_) => PipelineErrorKind::Provider,
            ConventionError::Substitution(_)
            | ConventionError::Glob(_)
            | ConventionError::Invalid(_) => PipelineErrorKind::Invalid,
        }
    }

    /// Name of the convention that failed.
    pub fn convention(&self) -> &str {
        let PipelineError::Convention { name, .. } = self;
        name
    }

    /// Reference code for the underlying failure, when it has one.
    pub fn reference(&self) -> Option<ErrorReference> {
        let PipelineError::Convention { source, .. } = self;
        source.reference()
    }
}
