// ABOUTME: Upload command implementation.
// ABOUTME: Runs the single upload convention over the configured targets.

use super::Deployment;
use conveyor::convention::ConventionPipeline;
use conveyor::error::Result;
use conveyor::output::Output;
use conveyor::substitution::TokenSubstitutor;
use conveyor::upload::UploadObjects;
use std::sync::Arc;

pub async fn upload(deployment: Deployment, output: Output) -> Result<()> {
    let config = &deployment.config;
    let upload = config.upload()?;

    let factory = config.provider.factory(deployment.context.current_directory());
    let pipeline = ConventionPipeline::new().then(UploadObjects::new(
        factory,
        Arc::new(TokenSubstitutor),
        upload.bucket.clone(),
        upload.targets.clone(),
    ));

    deployment.run(pipeline, output).await
}
