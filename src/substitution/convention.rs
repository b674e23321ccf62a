// ABOUTME: Convention that substitutes variables in staged files.
// ABOUTME: Runs before anything that reads or ships those files.

use std::sync::Arc;

use async_trait::async_trait;

use super::{FileSubstitution, substitute_in_files};
use crate::context::{DeploymentContext, known};
use crate::convention::{Convention, ConventionError};

pub struct SubstituteInFiles {
    substitutor: Arc<dyn FileSubstitution>,
    patterns: Vec<String>,
}

impl SubstituteInFiles {
    pub fn new(substitutor: Arc<dyn FileSubstitution>, patterns: Vec<String>) -> Self {
        Self {
            substitutor,
            patterns,
        }
    }

    fn enabled(&self, context: &DeploymentContext) -> bool {
        let variables = &context.variables;
        !self.patterns.is_empty()
            && (!variables.contains(known::SUBSTITUTE_IN_FILES_ENABLED)
                || variables.get_flag(known::SUBSTITUTE_IN_FILES_ENABLED))
    }
}

#[async_trait]
impl Convention for SubstituteInFiles {
    fn name(&self) -> &str {
        "substitute-in-files"
    }

    async fn install(&self, context: &mut DeploymentContext) -> Result<(), ConventionError> {
        let processed = substitute_in_files(
            self.substitutor.as_ref(),
            context,
            |ctx| self.enabled(ctx),
            &self.patterns,
        )?;
        if !processed.is_empty() {
            tracing::info!("Processed {} file(s) for substitution", processed.len());
        }
        Ok(())
    }
}
