// ABOUTME: Stack provider that keeps one JSON state file per stack.
// ABOUTME: Operations settle synchronously and leave the events a real provider would.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::io_error;
use crate::provider::{
    Capability, CreateStackRequest, Parameter, ProviderError, STACK_RESOURCE_TYPE,
    StackDescription, StackEvent, StackOutput, StackProvider, UpdateOutcome, UpdateStackRequest,
};
use crate::types::{StackId, StackName};

/// Statuses from which the provider refuses updates.
const NOT_UPDATABLE: &[&str] = &[
    "CREATE_FAILED",
    "ROLLBACK_COMPLETE",
    "ROLLBACK_FAILED",
    "DELETE_FAILED",
    "UPDATE_ROLLBACK_FAILED",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StackRecord {
    stack_id: StackId,
    name: String,
    status: String,
    template_body: String,
    parameters: Vec<Parameter>,
    outputs: Vec<StackOutput>,
    /// Most recent first.
    events: Vec<StackEvent>,
}

impl StackRecord {
    fn record(&mut self, status: &str, reason: Option<String>) {
        self.status = status.to_string();
        self.events.insert(
            0,
            StackEvent {
                timestamp: Utc::now(),
                logical_resource_id: self.name.clone(),
                resource_type: STACK_RESOURCE_TYPE.to_string(),
                status: status.to_string(),
                status_reason: reason,
            },
        );
    }

    fn describe(&self) -> StackDescription {
        StackDescription {
            stack_id: self.stack_id.clone(),
            name: self.name.clone(),
            status: self.status.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Stack provider persisting stacks under a state directory.
#[derive(Debug)]
pub struct LocalStackProvider {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl LocalStackProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    fn path(&self, name: &StackName) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn load(&self, name: &StackName) -> Result<Option<StackRecord>, ProviderError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ProviderError::new("InternalFailure", format!("corrupt stack state: {e}")))
    }

    fn save(&self, record: &StackRecord) -> Result<(), ProviderError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error("create", &self.dir, e))?;
        let path = self.dir.join(format!("{}.json", record.name));
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| ProviderError::new("InternalFailure", e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| io_error("write", &path, e))
    }

    fn missing(name: &StackName) -> ProviderError {
        ProviderError::new("ValidationError", format!("Stack with id {name} does not exist"))
    }
}

#[async_trait]
impl StackProvider for LocalStackProvider {
    async fn describe_stack(
        &self,
        name: &StackName,
    ) -> Result<Option<StackDescription>, ProviderError> {
        let _guard = self.lock.lock();
        Ok(self.load(name)?.map(|r| r.describe()))
    }

    async fn describe_stack_events(
        &self,
        name: &StackName,
    ) -> Result<Option<Vec<StackEvent>>, ProviderError> {
        let _guard = self.lock.lock();
        Ok(self.load(name)?.map(|r| r.events))
    }

    async fn create_stack(&self, request: &CreateStackRequest) -> Result<StackId, ProviderError> {
        let _guard = self.lock.lock();
        if self.load(&request.name)?.is_some() {
            return Err(ProviderError::new(
                "AlreadyExistsException",
                format!("Stack [{}] already exists", request.name),
            ));
        }
        check_capabilities(&request.template_body, &request.capabilities)?;

        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut record = StackRecord {
            stack_id: StackId::new(format!(
                "arn:local:cloudformation:local:000000000000:stack/{}/{stamp:x}",
                request.name
            )),
            name: request.name.to_string(),
            status: String::new(),
            template_body: request.template_body.clone(),
            parameters: request.parameters.clone(),
            outputs: Vec::new(),
            events: Vec::new(),
        };
        record.record("CREATE_IN_PROGRESS", Some("User Initiated".to_string()));

        match template_outputs(&request.template_body, &request.parameters) {
            Ok(outputs) => {
                record.outputs = outputs;
                record.record("CREATE_COMPLETE", None);
            }
            Err(reason) => {
                record.record("CREATE_FAILED", Some(reason));
                if !request.disable_rollback {
                    record.record("ROLLBACK_IN_PROGRESS", None);
                    record.record("ROLLBACK_COMPLETE", None);
                }
            }
        }

        self.save(&record)?;
        Ok(record.stack_id)
    }

    async fn update_stack(
        &self,
        request: &UpdateStackRequest,
    ) -> Result<UpdateOutcome, ProviderError> {
        let _guard = self.lock.lock();
        let mut record = self
            .load(&request.name)?
            .ok_or_else(|| Self::missing(&request.name))?;

        if NOT_UPDATABLE.contains(&record.status.as_str()) {
            return Err(ProviderError::new(
                "ValidationError",
                format!(
                    "Stack:{} is in {} state and can not be updated.",
                    record.stack_id, record.status
                ),
            ));
        }
        check_capabilities(&request.template_body, &request.capabilities)?;

        if record.template_body == request.template_body && record.parameters == request.parameters
        {
            return UpdateOutcome::from_response(Err(ProviderError::new(
                "ValidationError",
                "No updates are to be performed.",
            )));
        }

        record.record("UPDATE_IN_PROGRESS", Some("User Initiated".to_string()));
        match template_outputs(&request.template_body, &request.parameters) {
            Ok(outputs) => {
                record.template_body = request.template_body.clone();
                record.parameters = request.parameters.clone();
                record.outputs = outputs;
                record.record("UPDATE_COMPLETE_CLEANUP_IN_PROGRESS", None);
                record.record("UPDATE_COMPLETE", None);
            }
            Err(reason) => {
                record.record("UPDATE_FAILED", Some(reason));
                record.record("UPDATE_ROLLBACK_IN_PROGRESS", None);
                record.record("UPDATE_ROLLBACK_COMPLETE", None);
            }
        }

        self.save(&record)?;
        Ok(UpdateOutcome::Updated(record.stack_id))
    }

    async fn delete_stack(&self, name: &StackName) -> Result<(), ProviderError> {
        let _guard = self.lock.lock();
        let path = self.path(name);
        // Deleting an absent stack succeeds, as it does remotely.
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| io_error("remove", &path, e))?;
        }
        Ok(())
    }
}

fn check_capabilities(template: &str, capabilities: &[Capability]) -> Result<(), ProviderError> {
    if template.contains("AWS::IAM::") && capabilities.is_empty() {
        return Err(ProviderError::new(
            "InsufficientCapabilitiesException",
            "Requires capabilities : [CAPABILITY_IAM]",
        ));
    }
    Ok(())
}

/// Parse a template and resolve its `Outputs` section.
///
/// Output values may be literal scalars or `{Ref: <parameter>}`.
fn template_outputs(template: &str, parameters: &[Parameter]) -> Result<Vec<StackOutput>, String> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(template).map_err(|e| format!("Template format error: {e}"))?;
    let mapping = value
        .as_mapping()
        .ok_or_else(|| "Template format error: template must be a mapping".to_string())?;

    let Some(outputs) = mapping.get("Outputs").and_then(|o| o.as_mapping()) else {
        return Ok(Vec::new());
    };

    let mut resolved = Vec::new();
    for (key, output) in outputs {
        let key = key
            .as_str()
            .ok_or_else(|| "Template format error: output names must be strings".to_string())?;
        let value = output
            .get("Value")
            .ok_or_else(|| format!("Template format error: output {key} has no Value"))?;
        resolved.push(StackOutput {
            key: key.to_string(),
            value: resolve_value(key, value, parameters)?,
        });
    }
    Ok(resolved)
}

fn resolve_value(
    key: &str,
    value: &serde_yaml::Value,
    parameters: &[Parameter],
) -> Result<String, String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Mapping(m) => {
            let name = m
                .get("Ref")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("Unsupported intrinsic in output {key}"))?;
            parameters
                .iter()
                .find(|p| p.key == name)
                .map(|p| p.value.clone())
                .ok_or_else(|| format!("Unresolved resource dependencies [{name}] in the Outputs block"))
        }
        _ => Err(format!("Unsupported value in output {key}")),
    }
}
