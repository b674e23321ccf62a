// ABOUTME: Provider selection for the deployment file.
// ABOUTME: Builds the client factory conventions use to reach stacks and buckets.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::provider::{LocalProviders, ProviderFactory};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Directory-backed stacks and buckets.
    #[default]
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    /// State directory for local providers, relative to the working directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".conveyor/state")
}

impl ProviderConfig {
    pub fn factory(&self, base_dir: &Path) -> Arc<dyn ProviderFactory> {
        match self.kind {
            ProviderKind::Local => {
                let root = if self.root.is_absolute() {
                    self.root.clone()
                } else {
                    base_dir.join(&self.root)
                };
                Arc::new(LocalProviders::new(root))
            }
        }
    }
}
