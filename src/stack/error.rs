// ABOUTME: Error types for stack reconciliation.
// ABOUTME: Each fatal error carries a reference code operators can look up.

use std::path::PathBuf;
use std::time::Duration;

use crate::provider::{ErrorReference, ProviderError, references};
use crate::types::StackNameError;

/// Errors that abort a stack reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// The provider refused a create, update, or delete.
    #[error("{}: permission denied to {operation} stack {stack}: {source}", references::STACK_ACCESS_DENIED)]
    AccessDenied {
        operation: &'static str,
        stack: String,
        source: ProviderError,
    },

    /// The stack settled in a failure or rollback status.
    #[error(
        "{}: stack {stack} finished in status {status}{}",
        references::STACK_FAILED,
        .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default()
    )]
    Failed {
        stack: String,
        status: String,
        reason: Option<String>,
    },

    /// The stack was expected to exist but does not.
    #[error("{}: stack {stack} does not exist", references::STACK_MISSING)]
    Missing { stack: String },

    /// The optional wait deadline passed before the stack settled.
    #[error(
        "{}: stack {stack} did not reach a terminal status within {}s",
        references::STACK_WAIT_TIMED_OUT,
        .waited.as_secs()
    )]
    WaitTimedOut { stack: String, waited: Duration },

    /// Any other provider failure.
    #[error("{}: failed to {operation} stack {stack}: {source}", references::STACK_PROVIDER_ERROR)]
    Provider {
        operation: &'static str,
        stack: String,
        source: ProviderError,
    },

    #[error("{}: failed to read {}: {source}", references::STACK_TEMPLATE_UNREADABLE, .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no template configured for stack {stack}")]
    MissingTemplate { stack: String },

    #[error("invalid stack parameters in {}: {source}", .path.display())]
    InvalidParameters {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid stack name '{name}': {source}")]
    InvalidName {
        name: String,
        source: StackNameError,
    },
}

impl StackError {
    /// Reference code for this failure, when it has one.
    pub fn reference(&self) -> Option<ErrorReference> {
        match self {
            StackError::AccessDenied { .. } => Some(references::STACK_ACCESS_DENIED),
            StackError::Failed { .. } => Some(references::STACK_FAILED),
            StackError::Missing { .. } => Some(references::STACK_MISSING),
            StackError::WaitTimedOut { .. } => Some(references::STACK_WAIT_TIMED_OUT),
            StackError::Provider { .. } => Some(references::STACK_PROVIDER_ERROR),
            StackError::Unreadable { .. } => Some(references::STACK_TEMPLATE_UNREADABLE),
            StackError::MissingTemplate { .. }
            | StackError::InvalidParameters { .. }
            | StackError::InvalidName { .. } => None,
        }
    }

    /// Wrap a provider error, separating permission failures from everything
    /// else.
    pub(crate) fn from_provider(
        operation: &'static str,
        stack: &impl ToString,
        source: ProviderError,
    ) -> Self {
        let stack = stack.to_string();
        if source.is_access_denied() {
            StackError::AccessDenied {
                operation,
                stack,
                source,
            }
        } else {
            StackError::Provider {
                operation,
                stack,
                source,
            }
        }
    }
}
