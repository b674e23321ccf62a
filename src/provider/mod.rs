// ABOUTME: Remote provider seams: stack provider, object store, and client factory.
// ABOUTME: Also hosts the shared error classifier and local providers.

mod classify;
mod error;
mod local;
mod object_store;
mod stack;

use std::sync::Arc;

pub use classify::{Disposition, ErrorClass, ErrorReference, classify, references};
pub use error::ProviderError;
pub use local::{LocalObjectStore, LocalProviders, LocalStackProvider};
pub use object_store::{CannedAcl, ObjectStore, PutObjectRequest, PutObjectResponse, StorageClass};
pub use stack::{
    Capability, CreateStackRequest, Parameter, STACK_RESOURCE_TYPE, StackDescription, StackEvent,
    StackOutput, StackProvider, UpdateOutcome, UpdateStackRequest,
};

use crate::context::DeploymentContext;

/// Builds provider clients for a deployment.
///
/// Conventions ask for a client when they run, so credentials or regions held
/// in the deployment's variables can shape the client.
pub trait ProviderFactory: Send + Sync {
    fn stack_provider(
        &self,
        context: &DeploymentContext,
    ) -> Result<Arc<dyn StackProvider>, ProviderError>;

    fn object_store(&self, context: &DeploymentContext)
    -> Result<Arc<dyn ObjectStore>, ProviderError>;
}
