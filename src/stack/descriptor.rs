// ABOUTME: Immutable description of the stack a deployment wants.
// ABOUTME: Name, template body, parameters, capabilities, and rollback flag.

use std::path::Path;

use super::StackError;
use crate::provider::{Capability, CreateStackRequest, Parameter, UpdateStackRequest};
use crate::types::StackName;

/// Desired state of one stack, fixed for the length of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDescriptor {
    name: StackName,
    template_body: String,
    parameters: Vec<Parameter>,
    capabilities: Vec<Capability>,
    disable_rollback: bool,
}

impl StackDescriptor {
    pub fn new(name: StackName, template_body: impl Into<String>) -> Self {
        Self {
            name,
            template_body: template_body.into(),
            parameters: Vec::new(),
            capabilities: Vec::new(),
            disable_rollback: false,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_disable_rollback(mut self, disable_rollback: bool) -> Self {
        self.disable_rollback = disable_rollback;
        self
    }

    pub fn name(&self) -> &StackName {
        &self.name
    }

    pub fn template_body(&self) -> &str {
        &self.template_body
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn disable_rollback(&self) -> bool {
        self.disable_rollback
    }

    pub(crate) fn create_request(&self) -> CreateStackRequest {
        CreateStackRequest {
            name: self.name.clone(),
            template_body: self.template_body.clone(),
            parameters: self.parameters.clone(),
            capabilities: self.capabilities.clone(),
            disable_rollback: self.disable_rollback,
        }
    }

    pub(crate) fn update_request(&self) -> UpdateStackRequest {
        UpdateStackRequest {
            name: self.name.clone(),
            template_body: self.template_body.clone(),
            parameters: self.parameters.clone(),
            capabilities: self.capabilities.clone(),
        }
    }
}

/// Read parameters from a JSON file in the provider's
/// `[{"ParameterKey": .., "ParameterValue": ..}]` shape.
pub fn load_parameters_file(path: &Path) -> Result<Vec<Parameter>, StackError> {
    let content = std::fs::read_to_string(path).map_err(|source| StackError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StackError::InvalidParameters {
        path: path.to_path_buf(),
        source,
    })
}
