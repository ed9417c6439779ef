// ABOUTME: Stack lifecycle management on top of the raw StackOps capability.
// ABOUTME: Paged and recursive listing, templates, mutations with deferred waiters.

mod console;
mod error;
mod manager;
mod template;
mod waiter;

pub use console::console_url;
pub use error::{StackError, StackErrorKind};
pub use manager::{NESTED_LISTING_CONCURRENCY, StackManager};
pub use template::{TemplateDocument, TemplateError};
pub use waiter::PendingMutation;
