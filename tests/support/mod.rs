// ABOUTME: Test support utilities.
// ABOUTME: Scriptable in-memory stack provider and object store that record every call.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use conveyor::context::DeploymentContext;
use conveyor::provider::{
    CreateStackRequest, ObjectStore, ProviderError, ProviderFactory, PutObjectRequest,
    PutObjectResponse, STACK_RESOURCE_TYPE, StackDescription, StackEvent, StackOutput,
    StackProvider, UpdateOutcome, UpdateStackRequest,
};
use conveyor::types::{StackId, StackName, VersionId};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("conveyor=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn access_denied() -> ProviderError {
    ProviderError::new("AccessDenied", "User is not authorized to perform this action")
}

/// Marks the point in a status script where the stack disappears.
const GONE: &str = "";

/// A call made against [`FakeStackProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum StackCall {
    Describe(String),
    Events(String),
    Create(CreateStackRequest),
    Update(UpdateStackRequest),
    Delete(String),
}

impl StackCall {
    #[allow(dead_code)]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StackCall::Create(_) | StackCall::Update(_) | StackCall::Delete(_)
        )
    }
}

#[derive(Debug, Clone)]
struct FakeStack {
    id: StackId,
    /// Status seen by successive event reads; the last entry repeats.
    statuses: VecDeque<String>,
    reads: i64,
}

impl FakeStack {
    fn current(&self) -> &str {
        self.statuses.front().map(String::as_str).unwrap_or(GONE)
    }

    fn advance(&mut self) {
        self.reads += 1;
        if self.statuses.len() > 1 {
            self.statuses.pop_front();
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    stacks: HashMap<String, FakeStack>,
    calls: Vec<StackCall>,
    next_id: usize,
}

/// Stack provider driven by per-stack status scripts.
///
/// Every event read advances the script by one entry, so a test can walk a
/// stack through in-progress states and count the polls it took.
#[derive(Debug)]
#[allow(dead_code)]
pub struct FakeStackProvider {
    state: Mutex<FakeState>,
    after_create: Vec<String>,
    after_update: Vec<String>,
    outputs: Vec<StackOutput>,
    resource_events: Vec<StackEvent>,
    failures: HashMap<&'static str, ProviderError>,
}

impl Default for FakeStackProvider {
    fn default() -> Self {
        Self {
            state: Mutex::default(),
            after_create: script(&["CREATE_IN_PROGRESS", "CREATE_COMPLETE"]),
            after_update: script(&["UPDATE_IN_PROGRESS", "UPDATE_COMPLETE"]),
            outputs: Vec::new(),
            resource_events: Vec::new(),
            failures: HashMap::new(),
        }
    }
}

fn script(statuses: &[&str]) -> Vec<String> {
    statuses.iter().map(|s| s.to_string()).collect()
}

/// Fixed base time; the top-level event for read `n` is stamped `n` seconds later.
#[allow(dead_code)]
pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
}

#[allow(dead_code)]
impl FakeStackProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing stack with a status script.
    pub fn with_stack(self, name: &str, statuses: &[&str]) -> Self {
        {
            let mut state = self.state.lock();
            state.next_id += 1;
            let id = StackId::new(format!("arn:fake:stack/{name}/{}", state.next_id));
            state.stacks.insert(
                name.to_string(),
                FakeStack {
                    id,
                    statuses: script(statuses).into(),
                    reads: 0,
                },
            );
        }
        self
    }

    pub fn after_create(mut self, statuses: &[&str]) -> Self {
        self.after_create = script(statuses);
        self
    }

    pub fn after_update(mut self, statuses: &[&str]) -> Self {
        self.after_update = script(statuses);
        self
    }

    pub fn with_outputs(mut self, outputs: &[(&str, &str)]) -> Self {
        self.outputs = outputs
            .iter()
            .map(|(k, v)| StackOutput {
                key: k.to_string(),
                value: v.to_string(),
            })
            .collect();
        self
    }

    /// Events for resources and nested stacks, returned alongside the
    /// top-level event on every read.
    pub fn with_resource_events(mut self, events: Vec<StackEvent>) -> Self {
        self.resource_events = events;
        self
    }

    /// Fail every call of `operation` (`describe`, `events`, `create`,
    /// `update`, `delete`) with `error`.
    pub fn failing(mut self, operation: &'static str, error: ProviderError) -> Self {
        self.failures.insert(operation, error);
        self
    }

    pub fn calls(&self) -> Vec<StackCall> {
        self.state.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<StackCall> {
        self.calls().into_iter().filter(StackCall::is_mutation).collect()
    }

    pub fn event_reads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StackCall::Events(_)))
            .count()
    }

    pub fn stack_id(&self, name: &str) -> Option<StackId> {
        self.state.lock().stacks.get(name).map(|s| s.id.clone())
    }

    fn check(&self, operation: &'static str) -> Result<(), ProviderError> {
        match self.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn missing(name: &str) -> ProviderError {
        ProviderError::new("ValidationError", format!("Stack with id {name} does not exist"))
    }
}

#[async_trait]
impl StackProvider for FakeStackProvider {
    async fn describe_stack(
        &self,
        name: &StackName,
    ) -> Result<Option<StackDescription>, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(StackCall::Describe(name.to_string()));
        self.check("describe")?;
        // With event reads refused, status reads are what move the script.
        let events_refused = self.failures.contains_key("events");

        let Some(stack) = state.stacks.get_mut(name.as_str()) else {
            return Ok(None);
        };
        let status = stack.current().to_string();
        let stack_id = stack.id.clone();
        if events_refused {
            stack.advance();
        }
        if status == GONE {
            state.stacks.remove(name.as_str());
            return Ok(None);
        }
        Ok(Some(StackDescription {
            stack_id,
            name: name.to_string(),
            status,
            outputs: self.outputs.clone(),
        }))
    }

    async fn describe_stack_events(
        &self,
        name: &StackName,
    ) -> Result<Option<Vec<StackEvent>>, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(StackCall::Events(name.to_string()));
        self.check("events")?;

        let Some(stack) = state.stacks.get_mut(name.as_str()) else {
            return Ok(None);
        };
        let status = stack.current().to_string();
        let reads = stack.reads;
        stack.advance();
        if status == GONE {
            state.stacks.remove(name.as_str());
            return Ok(None);
        }

        let mut events = self.resource_events.clone();
        events.push(StackEvent {
            timestamp: at(reads),
            logical_resource_id: name.to_string(),
            resource_type: STACK_RESOURCE_TYPE.to_string(),
            status,
            status_reason: None,
        });
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(Some(events))
    }

    async fn create_stack(&self, request: &CreateStackRequest) -> Result<StackId, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(StackCall::Create(request.clone()));
        self.check("create")?;

        if state.stacks.contains_key(request.name.as_str()) {
            return Err(ProviderError::new(
                "AlreadyExistsException",
                format!("Stack [{}] already exists", request.name),
            ));
        }
        state.next_id += 1;
        let id = StackId::new(format!("arn:fake:stack/{}/{}", request.name, state.next_id));
        state.stacks.insert(
            request.name.to_string(),
            FakeStack {
                id: id.clone(),
                statuses: self.after_create.clone().into(),
                reads: 0,
            },
        );
        Ok(id)
    }

    async fn update_stack(
        &self,
        request: &UpdateStackRequest,
    ) -> Result<UpdateOutcome, ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(StackCall::Update(request.clone()));

        let response = self.check("update").and_then(|()| {
            let stack = state
                .stacks
                .get_mut(request.name.as_str())
                .ok_or_else(|| Self::missing(request.name.as_str()))?;
            stack.statuses = self.after_update.clone().into();
            Ok(stack.id.clone())
        });
        UpdateOutcome::from_response(response)
    }

    async fn delete_stack(&self, name: &StackName) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.calls.push(StackCall::Delete(name.to_string()));
        self.check("delete")?;

        if let Some(stack) = state.stacks.get_mut(name.as_str()) {
            stack.statuses = script(&["DELETE_IN_PROGRESS", GONE]).into();
        }
        Ok(())
    }
}

/// Object store recording every put, with per-key failures.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct FakeObjectStore {
    puts: Mutex<Vec<PutObjectRequest>>,
    failures: HashMap<String, ProviderError>,
    unversioned: bool,
}

#[allow(dead_code)]
impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_key(mut self, key: &str, error: ProviderError) -> Self {
        self.failures.insert(key.to_string(), error);
        self
    }

    /// Respond without version ids, like a bucket without versioning.
    pub fn unversioned(mut self) -> Self {
        self.unversioned = true;
        self
    }

    pub fn puts(&self) -> Vec<PutObjectRequest> {
        self.puts.lock().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.puts().into_iter().map(|p| p.key).collect()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put_object(
        &self,
        request: &PutObjectRequest,
    ) -> Result<PutObjectResponse, ProviderError> {
        let mut puts = self.puts.lock();
        puts.push(request.clone());

        if let Some(error) = self.failures.get(&request.key) {
            return Err(error.clone());
        }
        Ok(PutObjectResponse {
            version_id: (!self.unversioned).then(|| VersionId::new(format!("v{}", puts.len()))),
            etag: None,
        })
    }
}

/// Factory handing out shared fakes.
#[allow(dead_code)]
pub struct FakeFactory {
    pub stacks: Arc<FakeStackProvider>,
    pub store: Arc<FakeObjectStore>,
}

#[allow(dead_code)]
impl FakeFactory {
    pub fn new(stacks: FakeStackProvider, store: FakeObjectStore) -> Self {
        Self {
            stacks: Arc::new(stacks),
            store: Arc::new(store),
        }
    }
}

impl ProviderFactory for FakeFactory {
    fn stack_provider(
        &self,
        _context: &DeploymentContext,
    ) -> Result<Arc<dyn StackProvider>, ProviderError> {
        Ok(self.stacks.clone())
    }

    fn object_store(
        &self,
        _context: &DeploymentContext,
    ) -> Result<Arc<dyn ObjectStore>, ProviderError> {
        Ok(self.store.clone())
    }
}

/// Write `files` (relative path, content) under `root`.
#[allow(dead_code)]
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}
