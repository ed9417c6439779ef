// ABOUTME: Shared types used across cloud provider trait definitions.
// ABOUTME: Stack summaries, resources, statuses, mutation requests, object versions, lifecycle rules.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{BucketId, StackId};

/// Resource type of a nested child stack.
pub const NESTED_STACK_TYPE: &str = "AWS::CloudFormation::Stack";

/// Resource type of a storage bucket.
pub const BUCKET_TYPE: &str = "AWS::S3::Bucket";

/// Every stack status the provider can report.
const STATUS_CATALOGUE: &[&str] = &[
    "CREATE_IN_PROGRESS",
    "CREATE_FAILED",
    "CREATE_COMPLETE",
    "ROLLBACK_IN_PROGRESS",
    "ROLLBACK_FAILED",
    "ROLLBACK_COMPLETE",
    "DELETE_IN_PROGRESS",
    "DELETE_FAILED",
    "DELETE_COMPLETE",
    "UPDATE_IN_PROGRESS",
    "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
    "UPDATE_COMPLETE",
    "UPDATE_FAILED",
    "UPDATE_ROLLBACK_IN_PROGRESS",
    "UPDATE_ROLLBACK_FAILED",
    "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
    "UPDATE_ROLLBACK_COMPLETE",
    "REVIEW_IN_PROGRESS",
    "IMPORT_IN_PROGRESS",
    "IMPORT_COMPLETE",
    "IMPORT_ROLLBACK_IN_PROGRESS",
    "IMPORT_ROLLBACK_FAILED",
    "IMPORT_ROLLBACK_COMPLETE",
];

/// A stack status as reported by the provider (e.g. `UPDATE_COMPLETE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackStatus(String);

impl StackStatus {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A stack can be looked up and mutated only once a mutation has settled:
    /// the status ends in `_COMPLETE` and is not part of a deletion.
    pub fn is_updateable(&self) -> bool {
        self.0.ends_with("_COMPLETE") && !self.0.starts_with("DELETE_")
    }

    pub fn is_in_progress(&self) -> bool {
        self.0.ends_with("_IN_PROGRESS")
    }

    pub fn is_failed(&self) -> bool {
        self.0.ends_with("_FAILED")
    }

    /// A stack can be torn down unless a mutation is running or it is
    /// already gone. Failed stacks (e.g. `DELETE_FAILED`) stay destroyable.
    pub fn is_destroyable(&self) -> bool {
        !self.is_in_progress() && self.0 != "DELETE_COMPLETE"
    }

    /// All updateable statuses, in catalogue order.
    pub fn updateable() -> Vec<StackStatus> {
        Self::catalogue(StackStatus::is_updateable)
    }

    /// All destroyable statuses, in catalogue order.
    pub fn destroyable() -> Vec<StackStatus> {
        Self::catalogue(StackStatus::is_destroyable)
    }

    fn catalogue(keep: fn(&StackStatus) -> bool) -> Vec<StackStatus> {
        STATUS_CATALOGUE
            .iter()
            .map(|s| StackStatus::new(*s))
            .filter(|s| keep(s))
            .collect()
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal events a completion waiter can block on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    CreateComplete,
    UpdateComplete,
    DeleteComplete,
}

impl StackEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackEvent::CreateComplete => "stackCreateComplete",
            StackEvent::UpdateComplete => "stackUpdateComplete",
            StackEvent::DeleteComplete => "stackDeleteComplete",
        }
    }
}

impl fmt::Display for StackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` once the listing is exhausted.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Summary row of a stack listing.
#[derive(Debug, Clone)]
pub struct StackSummary {
    pub id: StackId,
    pub name: String,
    pub status: StackStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A live stack with its parameters and outputs.
#[derive(Debug, Clone)]
pub struct Stack {
    pub id: StackId,
    pub name: String,
    pub status: StackStatus,
    pub parameters: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, String>,
    pub termination_protection: bool,
}

/// What happens to a resource when its stack is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    RetainExceptOnCreate,
    Snapshot,
}

impl DeletionPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Delete" => Some(DeletionPolicy::Delete),
            "Retain" => Some(DeletionPolicy::Retain),
            "RetainExceptOnCreate" => Some(DeletionPolicy::RetainExceptOnCreate),
            "Snapshot" => Some(DeletionPolicy::Snapshot),
            _ => None,
        }
    }

    /// Whether the resource outlives a stack deletion.
    pub fn retains(&self) -> bool {
        matches!(
            self,
            DeletionPolicy::Retain | DeletionPolicy::RetainExceptOnCreate
        )
    }
}

/// A resource provisioned by a stack.
#[derive(Debug, Clone)]
pub struct StackResource {
    /// Stack the resource belongs to (may be a nested stack).
    pub stack_id: StackId,
    pub logical_id: String,
    pub physical_id: Option<String>,
    pub resource_type: String,
    pub status: String,
    /// Read from the owning stack's template; unknown until annotated.
    pub deletion_policy: Option<DeletionPolicy>,
}

impl StackResource {
    pub fn is_nested_stack(&self) -> bool {
        self.resource_type == NESTED_STACK_TYPE
    }

    pub fn is_bucket(&self) -> bool {
        self.resource_type == BUCKET_TYPE
    }

    /// Physical id as a stack id, for nested stack resources.
    pub fn nested_stack_id(&self) -> Option<StackId> {
        if self.is_nested_stack() {
            self.physical_id.as_deref().map(StackId::new)
        } else {
            None
        }
    }

    /// Physical id as a bucket id, for bucket resources.
    pub fn bucket_id(&self) -> Option<BucketId> {
        if self.is_bucket() {
            self.physical_id.as_deref().map(BucketId::new)
        } else {
            None
        }
    }
}

/// Where a stack template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Url(String),
    Body(String),
}

/// Value of a stack parameter in a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Value(String),
    UsePrevious,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub key: String,
    pub value: ParameterValue,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: ParameterValue::Value(value.into()),
        }
    }

    pub fn use_previous(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: ParameterValue::UsePrevious,
        }
    }
}

/// Capabilities acknowledged on every mutation.
pub const DEFAULT_CAPABILITIES: &[&str] = &[
    "CAPABILITY_IAM",
    "CAPABILITY_NAMED_IAM",
    "CAPABILITY_AUTO_EXPAND",
];

/// A create or update request.
#[derive(Debug, Clone)]
pub struct StackRequest {
    pub stack_id: StackId,
    pub template: TemplateSource,
    pub parameters: Vec<Parameter>,
    pub capabilities: Vec<String>,
    /// Only honoured on create.
    pub termination_protection: bool,
}

impl StackRequest {
    pub fn new(stack_id: StackId, template: TemplateSource) -> Self {
        Self {
            stack_id,
            template,
            parameters: Vec::new(),
            capabilities: DEFAULT_CAPABILITIES.iter().map(|c| c.to_string()).collect(),
            termination_protection: false,
        }
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// One object version or delete marker in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: Option<String>,
}

impl ObjectVersion {
    pub fn new(key: impl Into<String>, version_id: Option<&str>) -> Self {
        Self {
            key: key.into(),
            version_id: version_id.map(str::to_string),
        }
    }
}

/// Continuation point of an object version listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker {
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
}

/// One page of object versions and delete markers.
#[derive(Debug, Clone)]
pub struct VersionPage {
    pub objects: Vec<ObjectVersion>,
    /// `None` once the listing reports no more items.
    pub next: Option<VersionMarker>,
}

/// A bucket lifecycle rule expiring objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRule {
    pub id: String,
    pub prefix: String,
    pub enabled: bool,
    pub expiration_days: i32,
    pub noncurrent_expiration_days: i32,
}

impl LifecycleRule {
    /// Single enabled rule covering the whole bucket, expiring current and
    /// noncurrent versions after one day.
    pub fn expire_all_after_one_day() -> Self {
        Self {
            id: "tdlctl-scheduled-deletion".to_string(),
            prefix: String::new(),
            enabled: true,
            expiration_days: 1,
            noncurrent_expiration_days: 1,
        }
    }
}
