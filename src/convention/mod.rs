// ABOUTME: Convention seam and the ordered pipeline that runs conventions.
// ABOUTME: Conventions share state only through the deployment context.

mod error;
mod pipeline;

pub use error::{ConventionError, PipelineError, PipelineErrorKind};
pub use pipeline::{ConventionPipeline, run_conventions};

use async_trait::async_trait;

use crate::context::DeploymentContext;

/// One step of a deployment.
///
/// Implementations hold only what they were constructed with; everything that
/// varies per deployment comes from the context.
#[async_trait]
pub trait Convention: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    async fn install(&self, context: &mut DeploymentContext) -> Result<(), ConventionError>;
}
