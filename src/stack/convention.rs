// ABOUTME: Conventions that deploy or delete one stack.
// ABOUTME: Read settings, evaluate variables, run the reconciler, publish outputs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::descriptor::{StackDescriptor, load_parameters_file};
use super::reconciler::{StackReconciler, WaitOptions};
use super::StackError;
use crate::context::DeploymentContext;
use crate::convention::{Convention, ConventionError};
use crate::provider::{Capability, Parameter, ProviderFactory};
use crate::types::StackName;

/// Output variable holding the stack id.
pub const STACK_ID_OUTPUT: &str = "AwsOutputs[StackId]";

/// Stack section of the deployment file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StackSettings {
    pub name: String,
    /// Only deploys read the template; deletes need just the name.
    #[serde(default)]
    pub template: Option<PathBuf>,
    /// Inline parameters; these win over the same keys from `parameters_file`.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// JSON file of `[{"ParameterKey", "ParameterValue"}]` entries.
    #[serde(default)]
    pub parameters_file: Option<PathBuf>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub disable_rollback: bool,
    /// Wait for the stack to settle and publish its outputs.
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

fn stack_name(raw: &str, context: &DeploymentContext) -> Result<StackName, StackError> {
    let name = context.variables.evaluate(raw);
    StackName::new(&name).map_err(|source| StackError::InvalidName { name, source })
}

/// Create or update the configured stack.
pub struct DeployStack {
    factory: Arc<dyn ProviderFactory>,
    settings: StackSettings,
    wait: WaitOptions,
}

impl DeployStack {
    pub fn new(factory: Arc<dyn ProviderFactory>, settings: StackSettings, wait: WaitOptions) -> Self {
        Self {
            factory,
            settings,
            wait,
        }
    }

    fn descriptor(&self, context: &DeploymentContext) -> Result<StackDescriptor, StackError> {
        let variables = &context.variables;
        let name = stack_name(&self.settings.name, context)?;

        let template = self
            .settings
            .template
            .as_ref()
            .ok_or_else(|| StackError::MissingTemplate {
                stack: name.to_string(),
            })?;
        let template_path = context.resolve_path(variables.evaluate(&template.to_string_lossy()));
        let template_body =
            std::fs::read_to_string(&template_path).map_err(|source| StackError::Unreadable {
                path: template_path.clone(),
                source,
            })?;

        let mut parameters = match &self.settings.parameters_file {
            Some(path) => load_parameters_file(
                &context.resolve_path(variables.evaluate(&path.to_string_lossy())),
            )?,
            None => Vec::new(),
        };
        for (key, value) in &self.settings.parameters {
            parameters.retain(|p| &p.key != key);
            parameters.push(Parameter::new(key.clone(), value.clone()));
        }
        for parameter in &mut parameters {
            parameter.value = variables.evaluate(&parameter.value);
        }

        Ok(StackDescriptor::new(name, template_body)
            .with_parameters(parameters)
            .with_capabilities(self.settings.capabilities.clone())
            .with_disable_rollback(self.settings.disable_rollback))
    }
}

#[async_trait]
impl Convention for DeployStack {
    fn name(&self) -> &str {
        "deploy-stack"
    }

    async fn install(&self, context: &mut DeploymentContext) -> Result<(), ConventionError> {
        let descriptor = self.descriptor(context)?;
        let provider = self.factory.stack_provider(context)?;

        let mut reconciler = StackReconciler::new(provider.as_ref(), self.wait);
        let outcome = reconciler.reconcile(&descriptor, self.settings.wait).await?;

        let variables = &mut context.variables;
        if let Some(id) = outcome.action.stack_id() {
            variables.set_output(STACK_ID_OUTPUT, id.as_str());
        }
        for output in &outcome.outputs {
            variables.set_output(&format!("AwsOutputs[{}]", output.key), output.value.clone());
        }
        Ok(())
    }
}

/// Delete the named stack if it exists.
pub struct DeleteStack {
    factory: Arc<dyn ProviderFactory>,
    name: String,
    wait_for_complete: bool,
    wait: WaitOptions,
}

impl DeleteStack {
    pub fn new(
        factory: Arc<dyn ProviderFactory>,
        name: impl Into<String>,
        wait_for_complete: bool,
        wait: WaitOptions,
    ) -> Self {
        Self {
            factory,
            name: name.into(),
            wait_for_complete,
            wait,
        }
    }
}

#[async_trait]
impl Convention for DeleteStack {
    fn name(&self) -> &str {
        "delete-stack"
    }

    async fn install(&self, context: &mut DeploymentContext) -> Result<(), ConventionError> {
        let name = stack_name(&self.name, context)?;
        let provider = self.factory.stack_provider(context)?;

        let mut reconciler = StackReconciler::new(provider.as_ref(), self.wait);
        reconciler.delete(&name, self.wait_for_complete).await?;
        Ok(())
    }
}
