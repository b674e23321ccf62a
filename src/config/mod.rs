// ABOUTME: Configuration types and parsing for conveyor.yml.
// ABOUTME: Handles YAML parsing, variable resolution, and context construction.

mod deserialize;
mod init;
mod polling;
mod provider;
mod value;

pub use init::init_config;
pub use polling::PollingConfig;
pub use provider::{ProviderConfig, ProviderKind};
pub use value::{VariableValue, parse_override, resolve_values};

use crate::context::{DeploymentContext, Variables, known};
use crate::error::{Error, Result};
use crate::stack::StackSettings;
use crate::upload::UploadTarget;
use deserialize::deserialize_targets;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "conveyor.yml";
pub const CONFIG_FILENAME_ALT: &str = "conveyor.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".conveyor/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Release package, relative to the working directory.
    #[serde(default)]
    pub package: Option<PathBuf>,

    /// Directory conventions read and rewrite; defaults to the working directory.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    #[serde(default)]
    pub variables: HashMap<String, VariableValue>,

    /// Action name that scopes published output variables.
    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    /// Glob patterns of staged files to substitute before deploying a stack.
    #[serde(default)]
    pub substitute: Vec<String>,

    #[serde(default)]
    pub stack: Option<StackSettings>,

    #[serde(default)]
    pub upload: Option<UploadConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub bucket: String,

    #[serde(deserialize_with = "deserialize_targets")]
    pub targets: NonEmpty<UploadTarget>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn stack(&self) -> Result<&StackSettings> {
        self.stack.as_ref().ok_or(Error::MissingSection("stack"))
    }

    pub fn upload(&self) -> Result<&UploadConfig> {
        self.upload.as_ref().ok_or(Error::MissingSection("upload"))
    }

    /// Build the variable set: configured values, then the action name, then
    /// command-line overrides, each winning over the last.
    pub fn variables(&self, overrides: &[(String, String)]) -> Result<Variables> {
        let mut variables: Variables = resolve_values(&self.variables)?.into_iter().collect();

        if let Some(action) = &self.action {
            variables.set(known::ACTION_NAME, action.clone());
        }
        for (name, value) in overrides {
            variables.set(name.clone(), value.clone());
        }
        Ok(variables)
    }

    /// Deployment context rooted at `dir` with this file's package and staging
    /// directory.
    pub fn context(&self, dir: &Path, variables: Variables) -> DeploymentContext {
        let mut context = DeploymentContext::new(dir, variables);

        if let Some(staging) = &self.staging_dir {
            let staging = context.resolve_path(context.variables.evaluate(&staging.to_string_lossy()));
            context = context.with_staging_directory(staging);
        }
        if let Some(package) = &self.package {
            let package = context.resolve_path(context.variables.evaluate(&package.to_string_lossy()));
            context = context.with_package(package);
        }
        context
    }

    pub fn template() -> Self {
        Config {
            package: None,
            staging_dir: None,
            variables: HashMap::from([(
                "Environment".to_string(),
                VariableValue::Literal("dev".to_string()),
            )]),
            action: None,
            polling: PollingConfig::default(),
            provider: ProviderConfig::default(),
            substitute: Vec::new(),
            stack: Some(StackSettings {
                name: "my-app-#{Environment}".to_string(),
                template: Some(PathBuf::from("template.yml")),
                parameters: [("Environment".to_string(), "#{Environment}".to_string())]
                    .into_iter()
                    .collect(),
                parameters_file: None,
                capabilities: Vec::new(),
                disable_rollback: false,
                wait: true,
            }),
            upload: Some(UploadConfig {
                bucket: "my-app-assets".to_string(),
                targets: NonEmpty::new(UploadTarget::FileSet {
                    pattern: "public/**/*".to_string(),
                    key_prefix: "#{Environment}/".to_string(),
                    substitution_patterns: None,
                    properties: Default::default(),
                }),
            }),
        }
    }
}
