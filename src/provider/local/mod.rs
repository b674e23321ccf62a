// ABOUTME: Local providers backed by a state directory instead of a cloud account.
// ABOUTME: Used by the binary's `local` provider kind and by CLI tests.

mod object_store;
mod stack;

pub use object_store::LocalObjectStore;
pub use stack::LocalStackProvider;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ObjectStore, ProviderError, ProviderFactory, StackProvider};
use crate::context::DeploymentContext;

/// Factory handing out local providers rooted at one directory.
#[derive(Debug, Clone)]
pub struct LocalProviders {
    root: PathBuf,
}

impl LocalProviders {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProviderFactory for LocalProviders {
    fn stack_provider(
        &self,
        _context: &DeploymentContext,
    ) -> Result<Arc<dyn StackProvider>, ProviderError> {
        Ok(Arc::new(LocalStackProvider::new(self.root.join("stacks"))))
    }

    fn object_store(
        &self,
        _context: &DeploymentContext,
    ) -> Result<Arc<dyn ObjectStore>, ProviderError> {
        Ok(Arc::new(LocalObjectStore::new(self.root.join("buckets"))))
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> ProviderError {
    ProviderError::new(
        "InternalFailure",
        format!("failed to {action} {}: {e}", path.display()),
    )
}
