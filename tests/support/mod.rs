// ABOUTME: Test support utilities.
// ABOUTME: Provides an in-memory cloud provider, a scripted confirmation gate, and tracing setup.

use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Once;
use tdlctl::cloud::{
    BucketOps, FunctionOps, FunctionResponse, LifecycleRule, MAX_DELETE_BATCH, ObjectVersion,
    Page, ProviderError, Stack, StackEvent, StackOps, StackRequest, StackResource, StackStatus,
    StackSummary, TemplateSource, VersionMarker, VersionPage,
};
use tdlctl::error::Result;
use tdlctl::invoke::Confirm;
use tdlctl::types::{BucketId, FunctionName, StackId};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("tdlctl=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Everything the fake provider knows and records.
#[derive(Default)]
#[allow(dead_code)]
pub struct CloudState {
    pub stacks: Vec<StackSummary>,
    pub resources: HashMap<String, Vec<StackResource>>,
    pub templates: HashMap<String, String>,
    pub described: HashMap<String, Stack>,
    /// Items per listing page; zero means everything in one page.
    pub page_size: usize,
    pub stack_list_calls: usize,
    pub listings_in_flight: usize,
    pub max_listings_in_flight: usize,

    pub created: Vec<StackRequest>,
    pub updated: Vec<StackRequest>,
    pub update_error: Option<ProviderError>,
    pub validated: Vec<TemplateSource>,
    /// Consumed front to back by successive delete calls.
    pub delete_failures: VecDeque<ProviderError>,
    pub delete_calls: usize,
    pub deleted_stacks: Vec<String>,
    pub unprotected: Vec<String>,
    pub waited: Vec<(String, StackEvent)>,
    pub wait_error: Option<ProviderError>,

    pub buckets: HashMap<String, Vec<ObjectVersion>>,
    pub version_page_size: usize,
    pub delete_batches: Vec<usize>,
    pub bucket_delete_error: Option<ProviderError>,
    pub deleted_buckets: Vec<String>,
    pub lifecycle_rules: HashMap<String, LifecycleRule>,

    pub functions: HashMap<String, FunctionResponse>,
    pub invocations: Vec<(String, Value)>,
}

/// In-memory provider implementing every capability trait.
#[allow(dead_code)]
pub struct FakeCloud {
    region: String,
    state: Mutex<CloudState>,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Self {
        Self {
            region: "eu-west-1".to_string(),
            state: Mutex::new(CloudState::default()),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock()
    }

    pub fn with(self, setup: impl FnOnce(&mut CloudState)) -> Self {
        {
            let mut state = self.state.lock();
            setup(&mut *state);
        }
        self
    }
}

#[allow(dead_code)]
pub fn summary(name: &str, id: &str, status: &str) -> StackSummary {
    StackSummary {
        id: StackId::new(id),
        name: name.to_string(),
        status: StackStatus::new(status),
        created_at: None,
        updated_at: None,
    }
}

#[allow(dead_code)]
pub fn resource(stack: &str, logical_id: &str, physical_id: &str, resource_type: &str) -> StackResource {
    StackResource {
        stack_id: StackId::new(stack),
        logical_id: logical_id.to_string(),
        physical_id: Some(physical_id.to_string()),
        resource_type: resource_type.to_string(),
        status: "CREATE_COMPLETE".to_string(),
        deletion_policy: None,
    }
}

/// `count` object versions with sortable keys.
#[allow(dead_code)]
pub fn versions(count: usize) -> Vec<ObjectVersion> {
    (0..count)
        .map(|i| ObjectVersion::new(format!("obj-{i:06}"), Some("v1")))
        .collect()
}

#[allow(dead_code)]
pub fn response(status_code: i32, function_error: Option<&str>, payload: &str) -> FunctionResponse {
    FunctionResponse {
        status_code,
        function_error: function_error.map(str::to_string),
        payload: payload.as_bytes().to_vec(),
    }
}

fn page<T: Clone>(items: &[T], size: usize, token: Option<&str>) -> Page<T> {
    let start = token.and_then(|t| t.parse().ok()).unwrap_or(0);
    let size = if size == 0 { items.len().max(1) } else { size };
    let end = (start + size).min(items.len());
    Page {
        items: items[start.min(end)..end].to_vec(),
        next_token: (end < items.len()).then(|| end.to_string()),
    }
}

fn version_key(object: &ObjectVersion) -> (String, String) {
    (object.key.clone(), object.version_id.clone().unwrap_or_default())
}

fn missing(what: &str) -> ProviderError {
    ProviderError::NotFound(format!("{what} does not exist"))
}

#[async_trait]
impl StackOps for FakeCloud {
    fn region(&self) -> &str {
        &self.region
    }

    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        next_token: Option<&str>,
    ) -> std::result::Result<Page<StackSummary>, ProviderError> {
        let mut state = self.state.lock();
        state.stack_list_calls += 1;
        let matching: Vec<StackSummary> = state
            .stacks
            .iter()
            .filter(|s| statuses.contains(&s.status))
            .cloned()
            .collect();
        Ok(page(&matching, state.page_size, next_token))
    }

    async fn list_stack_resources(
        &self,
        stack: &StackId,
        next_token: Option<&str>,
    ) -> std::result::Result<Page<StackResource>, ProviderError> {
        {
            let mut state = self.state.lock();
            state.listings_in_flight += 1;
            state.max_listings_in_flight = state.max_listings_in_flight.max(state.listings_in_flight);
        }
        tokio::task::yield_now().await;

        let mut state = self.state.lock();
        state.listings_in_flight -= 1;
        let resources = state
            .resources
            .get(stack.as_str())
            .ok_or_else(|| missing(stack.as_str()))?;
        Ok(page(resources, state.page_size, next_token))
    }

    async fn describe_stack(&self, stack: &StackId) -> std::result::Result<Stack, ProviderError> {
        self.state
            .lock()
            .described
            .get(stack.as_str())
            .cloned()
            .ok_or_else(|| missing(stack.as_str()))
    }

    async fn get_template_body(&self, stack: &StackId) -> std::result::Result<String, ProviderError> {
        self.state
            .lock()
            .templates
            .get(stack.as_str())
            .cloned()
            .ok_or_else(|| missing(stack.as_str()))
    }

    async fn validate_template(&self, template: &TemplateSource) -> std::result::Result<(), ProviderError> {
        self.state.lock().validated.push(template.clone());
        Ok(())
    }

    async fn create_stack(&self, request: &StackRequest) -> std::result::Result<StackId, ProviderError> {
        self.state.lock().created.push(request.clone());
        Ok(StackId::new(format!("arn:stack/{}", request.stack_id)))
    }

    async fn update_stack(&self, request: &StackRequest) -> std::result::Result<StackId, ProviderError> {
        let mut state = self.state.lock();
        if let Some(err) = state.update_error.clone() {
            return Err(err);
        }
        state.updated.push(request.clone());
        Ok(request.stack_id.clone())
    }

    async fn delete_stack(&self, stack: &StackId) -> std::result::Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.delete_calls += 1;
        if let Some(err) = state.delete_failures.pop_front() {
            return Err(err);
        }
        state.deleted_stacks.push(stack.to_string());
        Ok(())
    }

    async fn set_termination_protection(
        &self,
        stack: &StackId,
        enabled: bool,
    ) -> std::result::Result<(), ProviderError> {
        if !enabled {
            self.state.lock().unprotected.push(stack.to_string());
        }
        Ok(())
    }

    async fn wait_for(&self, stack: &StackId, event: StackEvent) -> std::result::Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.waited.push((stack.to_string(), event));
        match state.wait_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BucketOps for FakeCloud {
    async fn list_object_versions(
        &self,
        bucket: &BucketId,
        marker: Option<&VersionMarker>,
    ) -> std::result::Result<VersionPage, ProviderError> {
        let state = self.state.lock();
        let objects = state
            .buckets
            .get(bucket.as_str())
            .ok_or_else(|| missing(bucket.as_str()))?;

        let mut remaining: Vec<ObjectVersion> = objects
            .iter()
            .filter(|o| match marker {
                Some(m) => {
                    version_key(o)
                        > (
                            m.key_marker.clone().unwrap_or_default(),
                            m.version_id_marker.clone().unwrap_or_default(),
                        )
                }
                None => true,
            })
            .cloned()
            .collect();
        remaining.sort_by_key(version_key);

        let size = if state.version_page_size == 0 {
            remaining.len()
        } else {
            state.version_page_size
        };
        let next = (remaining.len() > size).then(|| {
            let last = &remaining[size - 1];
            VersionMarker {
                key_marker: Some(last.key.clone()),
                version_id_marker: last.version_id.clone(),
            }
        });
        remaining.truncate(size);
        Ok(VersionPage {
            objects: remaining,
            next,
        })
    }

    async fn delete_objects(
        &self,
        bucket: &BucketId,
        objects: &[ObjectVersion],
    ) -> std::result::Result<(), ProviderError> {
        if objects.len() > MAX_DELETE_BATCH {
            return Err(ProviderError::Service("MalformedXML: too many objects".to_string()));
        }
        let mut state = self.state.lock();
        state.delete_batches.push(objects.len());
        let stored = state
            .buckets
            .get_mut(bucket.as_str())
            .ok_or_else(|| missing(bucket.as_str()))?;
        stored.retain(|o| !objects.contains(o));
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketId) -> std::result::Result<(), ProviderError> {
        let mut state = self.state.lock();
        if let Some(err) = state.bucket_delete_error.clone() {
            return Err(err);
        }
        let empty = state.buckets.get(bucket.as_str()).map(Vec::is_empty);
        match empty {
            None => Err(missing(bucket.as_str())),
            Some(false) => Err(ProviderError::Service("BucketNotEmpty".to_string())),
            Some(true) => {
                state.buckets.remove(bucket.as_str());
                state.deleted_buckets.push(bucket.to_string());
                Ok(())
            }
        }
    }

    async fn put_lifecycle_rule(
        &self,
        bucket: &BucketId,
        rule: &LifecycleRule,
    ) -> std::result::Result<(), ProviderError> {
        let mut state = self.state.lock();
        if !state.buckets.contains_key(bucket.as_str()) {
            return Err(missing(bucket.as_str()));
        }
        state.lifecycle_rules.insert(bucket.to_string(), rule.clone());
        Ok(())
    }
}

#[async_trait]
impl FunctionOps for FakeCloud {
    async fn invoke_function(
        &self,
        function: &FunctionName,
        payload: Vec<u8>,
    ) -> std::result::Result<FunctionResponse, ProviderError> {
        let mut state = self.state.lock();
        let argument = serde_json::from_slice(&payload).unwrap_or(Value::Null);
        state.invocations.push((function.to_string(), argument));
        state
            .functions
            .get(function.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("Function not found: {function}")))
    }
}

/// Answers prompts from a script, then with a fixed default. Records every prompt.
#[allow(dead_code)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    default: bool,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedConfirm {
    pub fn approving() -> Self {
        Self::new(Vec::new(), true)
    }

    pub fn declining() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn new(answers: Vec<bool>, default: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            default,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.answers.lock().pop_front().unwrap_or(self.default))
    }
}
