// ABOUTME: Error reported by a remote provider call.
// ABOUTME: Carries the provider-defined code and human-readable message.

use super::classify::{ErrorClass, classify};

/// Failure returned by a stack or object storage provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Where this error sits in the shared taxonomy.
    pub fn class(&self) -> ErrorClass {
        classify(self)
    }

    pub fn is_access_denied(&self) -> bool {
        self.class() == ErrorClass::AccessDenied
    }
}
