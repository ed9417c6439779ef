// ABOUTME: Provider error classification.
// ABOUTME: Maps raw provider error codes and messages to the cases callers branch on.

use crate::error::Error;

/// Errors from raw provider calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The addressed stack, bucket, or function does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A previous mutation is still cleaning up; the call may succeed later.
    #[error("cleanup in progress: {0}")]
    CleanupInProgress(String),

    /// An update request carried no changes.
    #[error("no updates to perform: {0}")]
    NoUpdates(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    /// A native completion waiter ended in a failure state or gave up.
    #[error("waiter failed: {0}")]
    WaiterFailed(String),

    #[error("provider error: {0}")]
    Service(String),
}

const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "NotFound",
    "ResourceNotFoundException",
    "StackNotFoundException",
];

impl ProviderError {
    /// Classify a provider error from its code and message.
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        let message = message.to_string();

        if let Some(code) = code {
            if NOT_FOUND_CODES.contains(&code) {
                return ProviderError::NotFound(message);
            }
            if code == "Throttling" || code == "ThrottlingException" {
                return ProviderError::Throttled(message);
            }
        }

        if message.contains("CLEANUP_IN_PROGRESS") {
            ProviderError::CleanupInProgress(message)
        } else if message.contains("No updates are to be performed") {
            ProviderError::NoUpdates(message)
        } else if message.contains("does not exist") {
            ProviderError::NotFound(message)
        } else {
            ProviderError::Service(message)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(message) => Error::NotFound {
                message,
                entity: None,
            },
            other => Error::server(other.to_string()),
        }
    }
}
