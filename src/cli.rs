// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use conveyor::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "conveyor")]
#[command(about = "Convention-driven deployments of infrastructure stacks and assets")]
#[command(version)]
pub struct Cli {
    /// Log provider calls and repeated status lines
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// How results are printed
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Normal)]
    pub output: OutputMode,

    /// Deployment file (defaults to conveyor.yml discovered in the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override a variable, as NAME=VALUE (repeatable)
    #[arg(long = "var", global = true, value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new conveyor.yml configuration file
    Init {
        /// Stack name to put in the template
        #[arg(long)]
        stack: Option<String>,

        /// Bucket name to put in the template
        #[arg(long)]
        bucket: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Substitute staged files, then create or update the configured stack
    DeployStack {
        /// Return once the create or update is submitted
        #[arg(long)]
        no_wait: bool,
    },

    /// Delete the configured stack if it exists
    DeleteStack {
        /// Return once the delete is submitted
        #[arg(long)]
        no_wait: bool,
    },

    /// Upload the configured targets to the object store
    Upload,
}
