// ABOUTME: Convention that uploads configured targets to one bucket.
// ABOUTME: Builds the object store client from the deployment context at run time.

use std::sync::Arc;

use async_trait::async_trait;
use nonempty::NonEmpty;

use super::{BatchUploader, UploadTarget};
use crate::context::DeploymentContext;
use crate::convention::{Convention, ConventionError};
use crate::provider::ProviderFactory;
use crate::substitution::FileSubstitution;

pub struct UploadObjects {
    factory: Arc<dyn ProviderFactory>,
    substitutor: Arc<dyn FileSubstitution>,
    bucket: String,
    targets: NonEmpty<UploadTarget>,
}

impl UploadObjects {
    pub fn new(
        factory: Arc<dyn ProviderFactory>,
        substitutor: Arc<dyn FileSubstitution>,
        bucket: impl Into<String>,
        targets: NonEmpty<UploadTarget>,
    ) -> Self {
        Self {
            factory,
            substitutor,
            bucket: bucket.into(),
            targets,
        }
    }
}

#[async_trait]
impl Convention for UploadObjects {
    fn name(&self) -> &str {
        "upload"
    }

    async fn install(&self, context: &mut DeploymentContext) -> Result<(), ConventionError> {
        let bucket = context.variables.evaluate(&self.bucket);
        if bucket.trim().is_empty() {
            return Err(ConventionError::Invalid(
                "upload bucket name is empty".to_string(),
            ));
        }

        let store = self.factory.object_store(context)?;
        let targets: Vec<UploadTarget> = self.targets.iter().cloned().collect();

        let mut uploader = BatchUploader::new(store.as_ref(), self.substitutor.as_ref(), bucket);
        let results = uploader.upload(&targets, context).await?;

        let failed = results.iter().filter(|r| !r.succeeded()).count();
        if failed > 0 {
            tracing::info!("{failed} object(s) skipped after per-object failures");
        }
        Ok(())
    }
}
