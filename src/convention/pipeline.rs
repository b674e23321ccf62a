// ABOUTME: Runs conventions strictly in order against one deployment context.
// ABOUTME: Stops at the first failure; earlier steps are not undone.

use snafu::ResultExt;

use super::error::{ConventionSnafu, PipelineError};
use super::Convention;
use crate::context::DeploymentContext;

/// Fixed, ordered list of conventions for one command.
#[derive(Default)]
pub struct ConventionPipeline {
    conventions: Vec<Box<dyn Convention>>,
}

impl ConventionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a convention, builder style.
    pub fn then(mut self, convention: impl Convention + 'static) -> Self {
        self.conventions.push(Box::new(convention));
        self
    }

    pub fn push(&mut self, convention: Box<dyn Convention>) {
        self.conventions.push(convention);
    }

    pub fn len(&self) -> usize {
        self.conventions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conventions.is_empty()
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.conventions.iter().map(|c| c.name()).collect()
    }

    pub async fn run(&self, context: &mut DeploymentContext) -> Result<(), PipelineError> {
        run_conventions(&self.conventions, context).await
    }
}

/// Install each convention in order, stopping at the first failure.
pub async fn run_conventions(
    conventions: &[Box<dyn Convention>],
    context: &mut DeploymentContext,
) -> Result<(), PipelineError> {
    let total = conventions.len();
    for (index, convention) in conventions.iter().enumerate() {
        tracing::info!("[{}/{}] {}", index + 1, total, convention.name());
        convention
            .install(context)
            .await
            .context(ConventionSnafu {
                name: convention.name(),
            })?;
    }
    Ok(())
}
