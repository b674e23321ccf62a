// ABOUTME: Declarative stack provider trait and its wire types.
// ABOUTME: Describe, events, create, update, and delete for named stacks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProviderError;
use crate::types::{StackId, StackName};

/// Resource type of a top-level stack (nested stacks share it).
pub const STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";

/// Stack operations offered by a declarative-template provider.
///
/// `describe_stack` and `describe_stack_events` return `Ok(None)` when the
/// stack does not exist; everything else the provider rejects is an error.
#[async_trait]
pub trait StackProvider: Send + Sync {
    /// Current description of a stack.
    async fn describe_stack(
        &self,
        name: &StackName,
    ) -> Result<Option<StackDescription>, ProviderError>;

    /// Events for a stack, most recent first.
    async fn describe_stack_events(
        &self,
        name: &StackName,
    ) -> Result<Option<Vec<StackEvent>>, ProviderError>;

    /// Create a stack and return its identifier.
    async fn create_stack(&self, request: &CreateStackRequest) -> Result<StackId, ProviderError>;

    /// Update a stack. Implementations report "nothing to update" as
    /// [`UpdateOutcome::NoChanges`] rather than an error.
    async fn update_stack(
        &self,
        request: &UpdateStackRequest,
    ) -> Result<UpdateOutcome, ProviderError>;

    /// Start deleting a stack.
    async fn delete_stack(&self, name: &StackName) -> Result<(), ProviderError>;
}

/// Result of an accepted update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The provider started an update.
    Updated(StackId),
    /// The stack already matches the submitted template and parameters.
    NoChanges,
}

impl UpdateOutcome {
    /// Fold a raw provider response into an outcome, turning the provider's
    /// "no updates" rejection into [`UpdateOutcome::NoChanges`].
    pub fn from_response(response: Result<StackId, ProviderError>) -> Result<Self, ProviderError> {
        match response {
            Ok(id) => Ok(UpdateOutcome::Updated(id)),
            Err(e) if e.class() == super::ErrorClass::NothingToUpdate => {
                Ok(UpdateOutcome::NoChanges)
            }
            Err(e) => Err(e),
        }
    }
}

/// Snapshot of a stack as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescription {
    pub stack_id: StackId,
    pub name: String,
    /// Raw provider status, e.g. `UPDATE_COMPLETE`.
    pub status: String,
    #[serde(default)]
    pub outputs: Vec<StackOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
}

/// One status record for a stack or one of its resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEvent {
    pub timestamp: DateTime<Utc>,
    pub logical_resource_id: String,
    pub resource_type: String,
    /// Raw provider status, e.g. `CREATE_FAILED`.
    pub status: String,
    #[serde(default)]
    pub status_reason: Option<String>,
}

impl StackEvent {
    /// Whether this event describes the named top-level stack rather than a
    /// resource inside it (including nested stacks).
    pub fn is_stack_event(&self, name: &StackName) -> bool {
        self.resource_type == STACK_RESOURCE_TYPE && self.logical_resource_id == name.as_str()
    }
}

/// Template parameter in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "ParameterKey")]
    pub key: String,
    #[serde(rename = "ParameterValue")]
    pub value: String,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Acknowledgements a template may require before the provider accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "CAPABILITY_IAM")]
    Iam,
    #[serde(rename = "CAPABILITY_NAMED_IAM")]
    NamedIam,
    #[serde(rename = "CAPABILITY_AUTO_EXPAND")]
    AutoExpand,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Iam => "CAPABILITY_IAM",
            Capability::NamedIam => "CAPABILITY_NAMED_IAM",
            Capability::AutoExpand => "CAPABILITY_AUTO_EXPAND",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStackRequest {
    pub name: StackName,
    pub template_body: String,
    pub parameters: Vec<Parameter>,
    pub capabilities: Vec<Capability>,
    pub disable_rollback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStackRequest {
    pub name: StackName,
    pub template_body: String,
    pub parameters: Vec<Parameter>,
    pub capabilities: Vec<Capability>,
}
