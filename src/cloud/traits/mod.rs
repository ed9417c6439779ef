// ABOUTME: Composable capability traits for cloud providers.
// ABOUTME: Defines StackOps, BucketOps, FunctionOps and the combined CloudProvider.

mod compute;
mod shared_types;
mod stack;
mod storage;

pub use compute::{FunctionOps, FunctionResponse};
pub use shared_types::*;
pub use stack::StackOps;
pub use storage::{BucketOps, MAX_DELETE_BATCH};

/// Full provider: every capability the lifecycle manager and invoker need.
///
/// Automatically implemented for any type implementing all capability traits.
pub trait CloudProvider: StackOps + BucketOps + FunctionOps {}

impl<T> CloudProvider for T where T: StackOps + BucketOps + FunctionOps {}
