// ABOUTME: Deployment context shared by every convention in a pipeline.
// ABOUTME: Carries package path, working and staging directories, and variables.

mod variables;

pub use variables::{OutputVariable, Variables, known};

use std::path::{Path, PathBuf};

/// Mutable record threaded through a convention pipeline.
///
/// Variables are the only channel conventions use to talk to each other and to
/// the orchestrator that invoked the deployment.
#[derive(Debug, Clone)]
pub struct DeploymentContext {
    package_path: Option<PathBuf>,
    current_directory: PathBuf,
    staging_directory: PathBuf,
    pub variables: Variables,
}

impl DeploymentContext {
    /// Create a context rooted at `current_directory`, which also serves as the
    /// staging directory until one is set.
    pub fn new(current_directory: impl Into<PathBuf>, variables: Variables) -> Self {
        let current_directory = current_directory.into();
        Self {
            package_path: None,
            staging_directory: current_directory.clone(),
            current_directory,
            variables,
        }
    }

    pub fn with_package(mut self, package_path: impl Into<PathBuf>) -> Self {
        self.package_path = Some(package_path.into());
        self
    }

    pub fn with_staging_directory(mut self, staging_directory: impl Into<PathBuf>) -> Self {
        self.staging_directory = staging_directory.into();
        self
    }

    pub fn package_path(&self) -> Option<&Path> {
        self.package_path.as_deref()
    }

    pub fn current_directory(&self) -> &Path {
        &self.current_directory
    }

    pub fn staging_directory(&self) -> &Path {
        &self.staging_directory
    }

    /// Resolve a path relative to the current directory; absolute paths pass through.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_directory.join(path)
        }
    }
}
