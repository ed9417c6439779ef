// ABOUTME: Teardown state marker types for the type state pattern.
// ABOUTME: Each state carries what the next destroy step needs.

use crate::cloud::StackResource;
use crate::stack::PendingMutation;
use crate::types::{BucketId, StackId};

/// Destroy requested against an explicitly targeted remote stack.
/// Available actions: `confirm()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Requested;

/// Both confirmations given.
/// Available actions: `enumerate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Confirmed;

/// Stack resolved and its buckets listed.
/// Available actions: `confirm_buckets()`, `clear_buckets()`
#[derive(Debug, Clone)]
pub struct Enumerated {
    pub(super) stack_id: StackId,
    pub(super) buckets: Vec<StackResource>,
}

/// Buckets destroyed or scheduled for deletion.
/// Available actions: `disable_protection()`
#[derive(Debug, Clone)]
pub struct BucketsCleared {
    pub(super) stack_id: StackId,
    pub(super) destroyed: Vec<BucketId>,
    pub(super) scheduled: Vec<BucketId>,
}

/// Termination protection off.
/// Available actions: `delete()`
#[derive(Debug, Clone)]
pub struct Unprotected {
    pub(super) stack_id: StackId,
    pub(super) destroyed: Vec<BucketId>,
    pub(super) scheduled: Vec<BucketId>,
}

/// Delete fired, completion not yet observed.
/// Available actions: `wait()`
#[derive(Debug)]
pub struct Deleting<'m, S: ?Sized> {
    pub(super) pending: PendingMutation<'m, S>,
    pub(super) destroyed: Vec<BucketId>,
    pub(super) scheduled: Vec<BucketId>,
}

/// Delete complete.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Destroyed {
    pub(super) stack_id: StackId,
    pub(super) destroyed: Vec<BucketId>,
    pub(super) scheduled: Vec<BucketId>,
}
