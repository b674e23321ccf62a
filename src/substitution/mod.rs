// ABOUTME: In-place variable substitution in deployment files.
// ABOUTME: Defines the substitution seam, the token substitutor, and its convention.

mod convention;

pub use convention::SubstituteInFiles;

use std::path::{Path, PathBuf};

use crate::context::{DeploymentContext, Variables};
use crate::files::{self, GlobError};

#[derive(Debug, thiserror::Error)]
pub enum SubstitutionError {
    #[error("failed to read {} for substitution: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write substituted {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Glob(#[from] GlobError),
}

/// Rewrites one file in place using the deployment's variables.
pub trait FileSubstitution: Send + Sync {
    /// Returns whether the file content changed.
    fn substitute(&self, path: &Path, variables: &Variables) -> Result<bool, SubstitutionError>;
}

/// Replaces `#{Name}` tokens; unknown tokens are left as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSubstitutor;

impl FileSubstitution for TokenSubstitutor {
    fn substitute(&self, path: &Path, variables: &Variables) -> Result<bool, SubstitutionError> {
        let original = std::fs::read_to_string(path).map_err(|source| SubstitutionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let substituted = variables.evaluate(&original);
        if substituted == original {
            tracing::debug!("No variables to substitute in {}", path.display());
            return Ok(false);
        }

        std::fs::write(path, substituted).map_err(|source| SubstitutionError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Substituted variables in {}", path.display());
        Ok(true)
    }
}

/// Substitute variables in every staging file matching `patterns`.
///
/// Does nothing unless `enabled` holds for the context. Returns the files that
/// were processed.
pub fn substitute_in_files(
    substitutor: &dyn FileSubstitution,
    context: &DeploymentContext,
    enabled: impl Fn(&DeploymentContext) -> bool,
    patterns: &[String],
) -> Result<Vec<PathBuf>, SubstitutionError> {
    if !enabled(context) {
        return Ok(Vec::new());
    }

    let patterns: Vec<String> = patterns
        .iter()
        .map(|p| context.variables.evaluate(p))
        .collect();
    let matched = files::glob_files(context.staging_directory(), &patterns)?;
    if matched.is_empty() {
        tracing::info!(
            "No files matched substitution patterns: {}",
            patterns.join(", ")
        );
    }

    for path in &matched {
        substitutor.substitute(path, &context.variables)?;
    }
    Ok(matched)
}
