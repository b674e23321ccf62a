// ABOUTME: Command module aggregator for the conveyor CLI.
// ABOUTME: Builds a deployment from config and runs each command's fixed pipeline.

mod stack;
mod upload;

pub use stack::{delete_stack, deploy_stack};
pub use upload::upload;

use conveyor::config::{Config, parse_override};
use conveyor::context::DeploymentContext;
use conveyor::convention::ConventionPipeline;
use conveyor::error::Result;
use conveyor::output::Output;
use std::path::{Path, PathBuf};

/// Loaded configuration plus the context a pipeline will run against.
pub struct Deployment {
    pub config: Config,
    pub context: DeploymentContext,
}

impl Deployment {
    /// Load the deployment file and build the initial context.
    pub fn prepare(dir: &Path, config_path: Option<&PathBuf>, vars: &[String]) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(&dir.join(path))?,
            None => Config::discover(dir)?,
        };

        let overrides = vars
            .iter()
            .map(|raw| parse_override(raw))
            .collect::<Result<Vec<_>>>()?;
        let variables = config.variables(&overrides)?;
        let context = config.context(dir, variables);

        Ok(Self { config, context })
    }

    /// Run `pipeline` and report published outputs.
    pub async fn run(mut self, pipeline: ConventionPipeline, mut output: Output) -> Result<()> {
        output.start_timer();
        output.progress(&format!("Running {}", pipeline.names().join(" -> ")));

        pipeline.run(&mut self.context).await?;

        output.success("Deployment complete");
        output.outputs(self.context.variables.outputs());
        Ok(())
    }
}
