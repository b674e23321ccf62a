// ABOUTME: Stack lifecycle state machine against a declarative stack provider.
// ABOUTME: Drains pending operations, creates, updates or recreates, then polls to a terminal status.

use std::time::Duration;

use tokio::time::Instant;

use super::StackError;
use super::descriptor::StackDescriptor;
use super::status::{self, StackStatus, StatusOutcome};
use crate::diagnostics::{Diagnostics, Warning};
use crate::provider::{
    ErrorClass, StackEvent, StackOutput, StackProvider, UpdateOutcome, references,
};
use crate::types::{StackId, StackName};

/// Interval between status checks when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling behaviour for waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Fixed sleep between status checks.
    pub interval: Duration,
    /// Optional deadline for a single wait. `None` polls until the stack settles.
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

/// What the reconciler did to the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackAction {
    /// The stack did not exist and was created.
    Created(StackId),
    /// The stack was stuck in a failed status, so it was deleted and created again.
    Recreated(StackId),
    /// An update was submitted.
    Updated(StackId),
    /// The stack already matched; nothing was submitted.
    ///
    /// The id is `None` when permission to describe the stack was refused.
    Unchanged(Option<StackId>),
}

impl StackAction {
    pub fn stack_id(&self) -> Option<&StackId> {
        match self {
            StackAction::Created(id) | StackAction::Recreated(id) | StackAction::Updated(id) => {
                Some(id)
            }
            StackAction::Unchanged(id) => id.as_ref(),
        }
    }
}

/// Result of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub action: StackAction,
    /// Stack outputs; only read after waiting for completion.
    pub outputs: Vec<StackOutput>,
}

/// How a wait judges the status it settles on.
#[derive(Debug, Clone, Copy)]
struct WaitCheck {
    /// Sleep before the first check, giving the provider time to register a
    /// call that was just made.
    settle_first: bool,
    /// Raise [`StackError::Failed`] when the stack settles in a failure status.
    fail_on_failure: bool,
    /// Raise [`StackError::Missing`] when the stack is gone.
    missing_is_failure: bool,
    /// Only a deletion status (or a missing stack) ends the wait.
    until_deleted: bool,
}

impl WaitCheck {
    /// Let any operation left over from an earlier run finish.
    const DRAIN: Self = Self {
        settle_first: false,
        fail_on_failure: false,
        missing_is_failure: false,
        until_deleted: false,
    };

    const DEPLOYED: Self = Self {
        settle_first: true,
        fail_on_failure: true,
        missing_is_failure: true,
        until_deleted: false,
    };

    const DELETED: Self = Self {
        settle_first: true,
        fail_on_failure: true,
        missing_is_failure: false,
        until_deleted: true,
    };

    fn is_settled(&self, observation: &Observation) -> bool {
        match observation.status {
            StackStatus::DoesNotExist => true,
            StackStatus::InProgress => false,
            StackStatus::Completed if self.until_deleted => observation
                .raw_status
                .as_deref()
                .is_none_or(|s| s.to_ascii_uppercase().starts_with("DELETE_")),
            StackStatus::Completed => true,
        }
    }
}

/// One look at the stack.
#[derive(Debug, Clone)]
struct Observation {
    status: StackStatus,
    /// `None` when the stack is missing or hidden by a permission failure.
    raw_status: Option<String>,
    reason: Option<String>,
}

impl Observation {
    fn missing() -> Self {
        Self {
            status: StackStatus::DoesNotExist,
            raw_status: None,
            reason: None,
        }
    }

    fn hidden(assumed: StackStatus) -> Self {
        Self {
            status: assumed,
            raw_status: None,
            reason: None,
        }
    }

    fn from_raw(raw: String, reason: Option<String>) -> Self {
        Self {
            status: status::outcome(&raw).into(),
            raw_status: Some(raw),
            reason,
        }
    }
}

/// Drives one stack from its current remote state to the described one.
///
/// The warning ledger and the last logged status line live on the value, so
/// separate reconcilers never share dedup state.
pub struct StackReconciler<'a> {
    provider: &'a dyn StackProvider,
    wait: WaitOptions,
    diagnostics: Diagnostics,
    last_status_message: Option<String>,
}

impl<'a> StackReconciler<'a> {
    pub fn new(provider: &'a dyn StackProvider, wait: WaitOptions) -> Self {
        Self {
            provider,
            wait,
            diagnostics: Diagnostics::default(),
            last_status_message: None,
        }
    }

    /// Warnings raised so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Create or update the stack so it matches `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns `StackError::AccessDenied` when a create, update, or delete is
    /// refused, and `StackError::Failed` when `wait_for_complete` is set and the
    /// stack settles in a failure or rollback status.
    pub async fn reconcile(
        &mut self,
        descriptor: &StackDescriptor,
        wait_for_complete: bool,
    ) -> Result<ReconcileOutcome, StackError> {
        let name = descriptor.name();

        self.wait_until_terminal(name, WaitCheck::DRAIN).await?;

        let current = self.observe(name, StackStatus::DoesNotExist).await?;
        let action = match current.status {
            StackStatus::DoesNotExist => StackAction::Created(self.create(descriptor).await?),
            _ if current.raw_status.as_deref().is_some_and(status::must_delete) => {
                tracing::info!(
                    "Stack {name} is in status {} and cannot be updated; deleting it before creating it again",
                    current.raw_status.as_deref().unwrap_or_default()
                );
                self.delete_and_wait(name).await?;
                StackAction::Recreated(self.create(descriptor).await?)
            }
            _ => self.update(descriptor).await?,
        };

        let mut outputs = Vec::new();
        if wait_for_complete {
            self.wait_until_terminal(name, WaitCheck::DEPLOYED).await?;
            outputs = self.stack_outputs(name).await?;
        }

        Ok(ReconcileOutcome { action, outputs })
    }

    /// Delete the stack if it exists. Returns whether a delete was submitted.
    ///
    /// A missing stack is not an error.
    pub async fn delete(
        &mut self,
        name: &StackName,
        wait_for_complete: bool,
    ) -> Result<bool, StackError> {
        self.wait_until_terminal(name, WaitCheck::DRAIN).await?;

        let current = self.observe(name, StackStatus::Completed).await?;
        if current.status == StackStatus::DoesNotExist {
            tracing::info!("Stack {name} does not exist; nothing to delete");
            return Ok(false);
        }

        tracing::info!("Deleting stack {name}");
        self.provider
            .delete_stack(name)
            .await
            .map_err(|e| StackError::from_provider("delete", name, e))?;

        if wait_for_complete {
            self.wait_until_terminal(name, WaitCheck::DELETED).await?;
            tracing::info!("Stack {name} deleted");
        }
        Ok(true)
    }

    async fn create(&mut self, descriptor: &StackDescriptor) -> Result<StackId, StackError> {
        let name = descriptor.name();
        tracing::info!("Creating stack {name}");

        let id = self
            .provider
            .create_stack(&descriptor.create_request())
            .await
            .map_err(|e| StackError::from_provider("create", name, e))?;

        tracing::info!("Created stack {name} with id {id}");
        Ok(id)
    }

    async fn update(&mut self, descriptor: &StackDescriptor) -> Result<StackAction, StackError> {
        let name = descriptor.name();
        tracing::info!("Updating stack {name}");

        match self.provider.update_stack(&descriptor.update_request()).await {
            Ok(UpdateOutcome::Updated(id)) => Ok(StackAction::Updated(id)),
            Ok(UpdateOutcome::NoChanges) => {
                tracing::info!("No updates are to be performed for stack {name}");
                Ok(StackAction::Unchanged(self.existing_stack_id(name).await?))
            }
            Err(e) => Err(StackError::from_provider("update", name, e)),
        }
    }

    async fn delete_and_wait(&mut self, name: &StackName) -> Result<(), StackError> {
        self.provider
            .delete_stack(name)
            .await
            .map_err(|e| StackError::from_provider("delete", name, e))?;
        self.wait_until_terminal(name, WaitCheck::DELETED).await
    }

    async fn existing_stack_id(
        &mut self,
        name: &StackName,
    ) -> Result<Option<StackId>, StackError> {
        match self.provider.describe_stack(name).await {
            Ok(Some(description)) => Ok(Some(description.stack_id)),
            Ok(None) => Err(StackError::Missing {
                stack: name.to_string(),
            }),
            Err(e) if e.class() == ErrorClass::AccessDenied => {
                self.diagnostics.warn_once(Warning::new(
                    references::STACK_STATUS_ACCESS_DENIED,
                    format!("permission denied describing stack {name}; its id is unavailable"),
                ));
                Ok(None)
            }
            Err(e) => Err(StackError::from_provider("describe", name, e)),
        }
    }

    async fn stack_outputs(&mut self, name: &StackName) -> Result<Vec<StackOutput>, StackError> {
        match self.provider.describe_stack(name).await {
            Ok(Some(description)) => Ok(description.outputs),
            Ok(None) => Ok(Vec::new()),
            Err(e) if e.is_access_denied() => {
                self.diagnostics.warn_once(Warning::new(
                    references::STACK_OUTPUTS_ACCESS_DENIED,
                    format!("permission denied reading outputs of stack {name}; outputs will not be published"),
                ));
                Ok(Vec::new())
            }
            Err(e) => Err(StackError::from_provider("describe", name, e)),
        }
    }

    /// Poll until the stack's top-level status is terminal or the stack is gone.
    async fn wait_until_terminal(
        &mut self,
        name: &StackName,
        check: WaitCheck,
    ) -> Result<(), StackError> {
        let started = Instant::now();
        let mut first = true;

        let observation = loop {
            if check.settle_first || !first {
                tokio::time::sleep(self.wait.interval).await;
            }
            first = false;

            let observation = self.observe(name, StackStatus::Completed).await?;
            if let Some(raw) = &observation.raw_status {
                let reason = observation
                    .reason
                    .as_deref()
                    .map(|r| format!(" ({r})"))
                    .unwrap_or_default();
                self.log_status(format!("Stack {name}: {raw}{reason}"));
            }

            if check.is_settled(&observation) {
                break observation;
            }

            if let Some(timeout) = self.wait.timeout
                && started.elapsed() >= timeout
            {
                return Err(StackError::WaitTimedOut {
                    stack: name.to_string(),
                    waited: timeout,
                });
            }
        };

        match (observation.status, observation.raw_status) {
            (StackStatus::DoesNotExist, _) if check.missing_is_failure => {
                Err(StackError::Missing {
                    stack: name.to_string(),
                })
            }
            (_, Some(raw))
                if check.fail_on_failure && status::outcome(&raw) == StatusOutcome::Failure =>
            {
                let reason = self.failure_reason(name).await;
                if let Some(reason) = &reason {
                    tracing::error!("Stack {name} failed: {reason}");
                }
                Err(StackError::Failed {
                    stack: name.to_string(),
                    status: raw,
                    reason,
                })
            }
            _ => Ok(()),
        }
    }

    /// Look at the top-level stack status.
    ///
    /// A permission failure is downgraded to a one-time warning and `on_denied`
    /// is assumed instead.
    async fn observe(
        &mut self,
        name: &StackName,
        on_denied: StackStatus,
    ) -> Result<Observation, StackError> {
        let latest = match self.provider.describe_stack_events(name).await {
            Ok(None) => return Ok(Observation::missing()),
            Ok(Some(events)) => latest_stack_event(&events, name).cloned(),
            Err(e) => match e.class() {
                ErrorClass::StackMissing => return Ok(Observation::missing()),
                ErrorClass::AccessDenied => {
                    self.diagnostics.warn_once(Warning::new(
                        references::STACK_EVENTS_ACCESS_DENIED,
                        format!("permission denied reading events of stack {name}; progress will not be shown"),
                    ));
                    None
                }
                _ => return Err(StackError::from_provider("read events of", name, e)),
            },
        };

        if let Some(event) = latest {
            return Ok(Observation::from_raw(event.status, event.status_reason));
        }

        match self.provider.describe_stack(name).await {
            Ok(None) => Ok(Observation::missing()),
            Ok(Some(description)) => Ok(Observation::from_raw(description.status, None)),
            Err(e) => match e.class() {
                ErrorClass::StackMissing => Ok(Observation::missing()),
                ErrorClass::AccessDenied => {
                    self.diagnostics.warn_once(Warning::new(
                        references::STACK_STATUS_ACCESS_DENIED,
                        format!(
                            "permission denied checking status of stack {name}; assuming {on_denied:?}"
                        ),
                    ));
                    Ok(Observation::hidden(on_denied))
                }
                _ => Err(StackError::from_provider("describe", name, e)),
            },
        }
    }

    /// The reason attached to the most recent failed event, if it can be read.
    async fn failure_reason(&mut self, name: &StackName) -> Option<String> {
        match self.provider.describe_stack_events(name).await {
            Ok(Some(events)) => most_recent(events.iter().filter(|e| {
                status::outcome(&e.status) == StatusOutcome::Failure
                    && e.status_reason.as_deref().is_some_and(|r| !r.is_empty())
            }))
            .map(|e| {
                format!(
                    "{} {}: {}",
                    e.logical_resource_id,
                    e.status,
                    e.status_reason.as_deref().unwrap_or_default()
                )
            }),
            Ok(None) => None,
            Err(e) if e.is_access_denied() => {
                self.diagnostics.warn_once(Warning::new(
                    references::STACK_EVENTS_ACCESS_DENIED,
                    format!("permission denied reading events of stack {name}; the failure reason is unavailable"),
                ));
                None
            }
            Err(e) => {
                tracing::debug!("Could not read failure reason for stack {name}: {e}");
                None
            }
        }
    }

    /// Log a status line at info level only when it differs from the last one.
    /// Returns whether it was logged at info level.
    fn log_status(&mut self, message: String) -> bool {
        if self.last_status_message.as_deref() == Some(message.as_str()) {
            tracing::debug!("{message}");
            return false;
        }
        tracing::info!("{message}");
        self.last_status_message = Some(message);
        true
    }
}

/// Most recent event for the top-level stack itself, ignoring its resources and
/// nested stacks.
fn latest_stack_event<'e>(events: &'e [StackEvent], name: &StackName) -> Option<&'e StackEvent> {
    most_recent(events.iter().filter(|e| e.is_stack_event(name)))
}

/// Latest event by timestamp; ties keep the earlier entry, since providers list
/// the newest event first.
fn most_recent<'e>(events: impl Iterator<Item = &'e StackEvent>) -> Option<&'e StackEvent> {
    events.reduce(|best, e| if e.timestamp > best.timestamp { e } else { best })
}
