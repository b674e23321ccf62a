// ABOUTME: Stack command implementations.
// ABOUTME: deploy-stack substitutes staged files before reconciling; delete-stack only deletes.

use super::Deployment;
use conveyor::convention::ConventionPipeline;
use conveyor::error::Result;
use conveyor::output::Output;
use conveyor::stack::{DeleteStack, DeployStack};
use conveyor::substitution::{SubstituteInFiles, TokenSubstitutor};
use std::sync::Arc;

pub async fn deploy_stack(deployment: Deployment, no_wait: bool, output: Output) -> Result<()> {
    let config = &deployment.config;
    let mut settings = config.stack()?.clone();
    if no_wait {
        settings.wait = false;
    }

    let factory = config.provider.factory(deployment.context.current_directory());
    let pipeline = ConventionPipeline::new()
        .then(SubstituteInFiles::new(
            Arc::new(TokenSubstitutor),
            config.substitute.clone(),
        ))
        .then(DeployStack::new(
            factory,
            settings,
            config.polling.wait_options(),
        ));

    deployment.run(pipeline, output).await
}

pub async fn delete_stack(deployment: Deployment, no_wait: bool, output: Output) -> Result<()> {
    let config = &deployment.config;
    let settings = config.stack()?;

    let factory = config.provider.factory(deployment.context.current_directory());
    let pipeline = ConventionPipeline::new().then(DeleteStack::new(
        factory,
        settings.name.clone(),
        !no_wait,
        config.polling.wait_options(),
    ));

    deployment.run(pipeline, output).await
}
