// ABOUTME: Entry point for the conveyor CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Deployment;
use conveyor::config;
use conveyor::error::Result;
use conveyor::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag when set
    let default_level = match (cli.verbose, cli.output) {
        (true, _) => "debug",
        (false, OutputMode::Normal) => "info",
        (false, _) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mode = cli.output;
    if let Err(e) = run(cli).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir()?;
    let output = Output::new(cli.output);

    match cli.command {
        Commands::Init {
            stack,
            bucket,
            force,
        } => {
            config::init_config(&cwd, stack.as_deref(), bucket.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::DeployStack { no_wait } => {
            let deployment = Deployment::prepare(&cwd, cli.config.as_ref(), &cli.vars)?;
            commands::deploy_stack(deployment, no_wait, output).await
        }
        Commands::DeleteStack { no_wait } => {
            let deployment = Deployment::prepare(&cwd, cli.config.as_ref(), &cli.vars)?;
            commands::delete_stack(deployment, no_wait, output).await
        }
        Commands::Upload => {
            let deployment = Deployment::prepare(&cwd, cli.config.as_ref(), &cli.vars)?;
            commands::upload(deployment, output).await
        }
    }
}
