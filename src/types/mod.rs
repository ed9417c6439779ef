// ABOUTME: Type-safe identifiers and validated naming types.
// ABOUTME: Uses phantom types to keep stack and bucket ids apart at compile time.

mod function_name;
mod id;
mod stack_name;

pub use function_name::FunctionName;
pub use id::{BucketId, Id, StackId};
pub use stack_name::{COMPANION_MAX_LEN, COMPANION_SUFFIX, StackName, StackNameError};
